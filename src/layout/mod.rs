//! Layout: the measure/arrange engine and the taffy-backed flex helper.

pub mod engine;
pub mod flex;

pub use engine::{update_layout, LayoutCx};
pub use flex::{compute_flex, FlexAlign, FlexDirection, FlexItem, FlexJustify, FlexParams};
