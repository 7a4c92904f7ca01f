//! Crate-wide error type.
//!
//! Every fallible operation in vellum returns [`Result`]. Hit-test misses are
//! not errors: hit testing returns `Option<ElementId>`.

use crate::property::{PropertyId, ValueType};

/// Errors surfaced by the property system, the element tree, layout and the
/// frame pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UiError {
    /// The same `(owner, name)` pair was registered twice with different types.
    #[error("property {owner}.{name} already registered as {existing}, cannot re-register as {requested}")]
    PropertyConflict {
        owner: String,
        name: String,
        existing: ValueType,
        requested: ValueType,
    },
    /// A read or write used a value type incompatible with the descriptor.
    #[error("type mismatch on {property}: expected {expected}, found {found}")]
    TypeMismatch {
        property: String,
        expected: ValueType,
        found: ValueType,
    },
    /// The descriptor's validator or coercer rejected a value.
    #[error("value rejected by validator of {property}")]
    ValidationFailed { property: String },
    /// UI state was touched from a thread other than the one that created it.
    #[error("cross-thread access in {operation}")]
    CrossThreadAccess { operation: &'static str },
    /// The renderer could not initialize, resize or present.
    #[error("surface lost: {0}")]
    SurfaceLost(String),
    /// No descriptor with this id exists in the registry.
    #[error("unknown property id {0:?}")]
    UnknownProperty(PropertyId),
    /// The element id is stale or was never created.
    #[error("element not found")]
    ElementNotFound,
    /// A widget's measure, arrange or render hook failed.
    #[error("widget failure: {0}")]
    Widget(String),
    /// The flex layout engine rejected its input.
    #[error("layout failure: {0}")]
    Layout(String),
}

impl From<taffy::TaffyError> for UiError {
    fn from(err: taffy::TaffyError) -> Self {
        UiError::Layout(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, UiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_both_types() {
        let err = UiError::PropertyConflict {
            owner: "UIElement".into(),
            name: "Opacity".into(),
            existing: ValueType::Float,
            requested: ValueType::Bool,
        };
        let msg = err.to_string();
        assert!(msg.contains("UIElement.Opacity"));
        assert!(msg.contains("Float"));
        assert!(msg.contains("Bool"));
    }

    #[test]
    fn cross_thread_names_operation() {
        let err = UiError::CrossThreadAccess { operation: "set_value" };
        assert_eq!(err.to_string(), "cross-thread access in set_value");
    }
}
