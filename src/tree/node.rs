//! Element ids and per-element records.

use std::collections::HashMap;
use std::sync::Arc;

use slotmap::new_key_type;

use crate::event::{Handler, RoutedEvent};
use crate::geometry::{Rect, Size};
use crate::property::{PropertyChangedArgs, PropertyId, PropertyStore};
use crate::tree::name_scope::NameScope;
use crate::tree::template::Binding;
use crate::tree::ElementTree;
use crate::widget::Widget;

new_key_type! {
    /// Unique identifier for an element. Copy, lightweight (u64).
    pub struct ElementId;
}

/// Handle returned by [`ElementTree::add_handler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub(crate) u64);

/// Handle returned by [`ElementTree::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Generic change subscriber, invoked after the descriptor callback.
pub type ChangeSubscriber = Arc<dyn Fn(&mut ElementTree, &PropertyChangedArgs) + Send + Sync>;

// ---------------------------------------------------------------------------
// LayoutState
// ---------------------------------------------------------------------------

/// Measure/arrange bookkeeping for one element.
#[derive(Debug, Clone, Default)]
pub struct LayoutState {
    pub measure_valid: bool,
    pub arrange_valid: bool,
    /// Margin-inclusive size from the last measure.
    pub desired: Size,
    /// Available size passed to the last measure.
    pub last_available: Option<Size>,
    /// Slot handed to the last arrange, in parent coordinates.
    pub layout_slot: Option<Rect>,
    /// The element's own box after margin and alignment, in parent
    /// coordinates. `None` when collapsed.
    pub layout_rect: Option<Rect>,
    /// Size returned by `arrange_core`.
    pub render_size: Size,
    /// A measure/arrange failure has already been logged.
    pub failure_reported: bool,
}

// ---------------------------------------------------------------------------
// ElementData
// ---------------------------------------------------------------------------

/// Everything the tree knows about one element.
pub struct ElementData {
    /// Taken out while one of its hooks runs.
    pub(crate) widget: Option<Box<dyn Widget>>,
    pub(crate) type_name: &'static str,
    pub(crate) values: PropertyStore,
    pub(crate) layout: LayoutState,
    /// Non-owning back-reference to the element whose template produced this one.
    pub(crate) templated_parent: Option<ElementId>,
    pub(crate) name_scope: Option<NameScope>,
    /// Whether the visual parent owns this element.
    pub(crate) owned: bool,
    pub(crate) handlers: Vec<(HandlerId, RoutedEvent, Handler)>,
    pub(crate) subscribers: Vec<(SubscriptionId, ChangeSubscriber)>,
    pub(crate) bindings: HashMap<PropertyId, Binding>,
    /// `(own property, templated-parent property)` pairs.
    pub(crate) template_binds: Vec<(PropertyId, PropertyId)>,
}

impl ElementData {
    pub(crate) fn new(widget: Box<dyn Widget>) -> Self {
        Self {
            type_name: widget.type_name(),
            widget: Some(widget),
            values: PropertyStore::new(),
            layout: LayoutState::default(),
            templated_parent: None,
            name_scope: None,
            owned: false,
            handlers: Vec::new(),
            subscribers: Vec::new(),
            bindings: HashMap::new(),
            template_binds: Vec::new(),
        }
    }

    /// The widget type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Stored property values.
    pub fn values(&self) -> &PropertyStore {
        &self.values
    }

    /// Layout bookkeeping.
    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }
}

impl std::fmt::Debug for ElementData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementData")
            .field("type_name", &self.type_name)
            .field("values", &self.values.len())
            .field("layout", &self.layout)
            .field("templated_parent", &self.templated_parent)
            .field("owned", &self.owned)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
