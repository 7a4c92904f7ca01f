//! The element tree: arena, edges, property values, transforms, name scopes
//! and templates.
//!
//! [`ElementTree`] owns every element of one window. Widgets never hold
//! element ids of their own; all structure lives in the arena.

pub mod name_scope;
pub mod node;
pub mod template;
#[allow(clippy::module_inception)]
pub mod tree;
pub mod values;
pub mod visual;

pub use name_scope::NameScope;
pub use node::{ChangeSubscriber, ElementData, ElementId, HandlerId, LayoutState, SubscriptionId};
pub use template::{Binding, ControlTemplate};
pub use tree::ElementTree;
pub use values::{ValueSource, MAX_CHANGE_DEPTH};
