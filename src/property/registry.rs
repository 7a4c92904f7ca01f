//! Property descriptors and the shared registry.
//!
//! A [`PropertyRegistry`] interns one [`PropertyDescriptor`] per
//! `(owner, name)` pair. Descriptors are immutable once registered and never
//! removed; the hot path addresses them by [`PropertyId`].

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::BitOr;
use std::sync::Arc;

use parking_lot::RwLock;

use super::value::{PropertyValue, Value, ValueType};
use crate::error::{Result, UiError};
use crate::tree::{ElementId, ElementTree};

// ---------------------------------------------------------------------------
// Ids and typed handles
// ---------------------------------------------------------------------------

/// Stable index of a descriptor within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(pub(crate) u32);

impl PropertyId {
    /// The raw index.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// A typed handle to a registered property.
///
/// Obtained from [`PropertyRegistry::register_typed`] or one of the core
/// constants in [`crate::property::core`].
pub struct Property<T> {
    id: PropertyId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    pub(crate) const fn from_index(index: u32) -> Self {
        Self {
            id: PropertyId(index),
            _marker: PhantomData,
        }
    }

    /// The untyped id.
    pub const fn id(self) -> PropertyId {
        self.id
    }
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Property<T> {}

impl<T> PartialEq for Property<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Property<T> {}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Property({})", self.id.0)
    }
}

impl<T> From<Property<T>> for PropertyId {
    fn from(p: Property<T>) -> Self {
        p.id
    }
}

// ---------------------------------------------------------------------------
// PropertyFlags
// ---------------------------------------------------------------------------

/// Invalidation and inheritance flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PropertyFlags(pub u8);

impl PropertyFlags {
    pub const NONE: PropertyFlags = PropertyFlags(0);
    pub const AFFECTS_MEASURE: PropertyFlags = PropertyFlags(1);
    pub const AFFECTS_ARRANGE: PropertyFlags = PropertyFlags(2);
    pub const AFFECTS_RENDER: PropertyFlags = PropertyFlags(4);
    pub const INHERITS: PropertyFlags = PropertyFlags(8);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: PropertyFlags) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for PropertyFlags {
    type Output = PropertyFlags;
    fn bitor(self, rhs: Self) -> Self::Output {
        PropertyFlags(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Change notification
// ---------------------------------------------------------------------------

/// Arguments passed to change callbacks and subscribers.
#[derive(Debug, Clone)]
pub struct PropertyChangedArgs {
    /// The element whose effective value changed.
    pub element: ElementId,
    /// The descriptor of the changed property.
    pub property: Arc<PropertyDescriptor>,
    pub old: Value,
    pub new: Value,
}

impl PropertyChangedArgs {
    /// Whether this change is for `property`.
    pub fn is(&self, property: impl Into<PropertyId>) -> bool {
        self.property.id == property.into()
    }

    /// The old value as `T`.
    pub fn old_as<T: PropertyValue>(&self) -> Option<T> {
        T::from_value(&self.old)
    }

    /// The new value as `T`.
    pub fn new_as<T: PropertyValue>(&self) -> Option<T> {
        T::from_value(&self.new)
    }
}

/// Per-property change callback, run synchronously after the new value is
/// visible to readers.
pub type ChangedCallback = Arc<dyn Fn(&mut ElementTree, &PropertyChangedArgs) + Send + Sync>;
/// Returns `false` to reject a value.
pub type Validator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
/// Maps a value into the legal range; `None` rejects it.
pub type Coercer = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

// ---------------------------------------------------------------------------
// PropertyMetadata
// ---------------------------------------------------------------------------

/// Default value, flags and hooks for a descriptor.
#[derive(Clone)]
pub struct PropertyMetadata {
    pub default: Value,
    pub flags: PropertyFlags,
    pub changed: Option<ChangedCallback>,
    pub validator: Option<Validator>,
    pub coercer: Option<Coercer>,
}

impl PropertyMetadata {
    /// Metadata with the given default and no flags or hooks.
    pub fn new(default: impl PropertyValue) -> Self {
        Self {
            default: default.into_value(),
            flags: PropertyFlags::NONE,
            changed: None,
            validator: None,
            coercer: None,
        }
    }

    /// Add flags (builder).
    pub fn with_flags(mut self, flags: PropertyFlags) -> Self {
        self.flags = self.flags | flags;
        self
    }

    /// Set the change callback (builder).
    pub fn on_changed(
        mut self,
        f: impl Fn(&mut ElementTree, &PropertyChangedArgs) + Send + Sync + 'static,
    ) -> Self {
        self.changed = Some(Arc::new(f));
        self
    }

    /// Set the validator (builder).
    pub fn with_validator(mut self, f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.validator = Some(Arc::new(f));
        self
    }

    /// Set the coercer (builder).
    pub fn with_coercer(
        mut self,
        f: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.coercer = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for PropertyMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("default", &self.default)
            .field("flags", &self.flags)
            .field("changed", &self.changed.is_some())
            .field("validator", &self.validator.is_some())
            .field("coercer", &self.coercer.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// PropertyDescriptor
// ---------------------------------------------------------------------------

/// An interned property definition.
#[derive(Debug)]
pub struct PropertyDescriptor {
    pub id: PropertyId,
    pub name: &'static str,
    pub owner: &'static str,
    pub value_type: ValueType,
    /// Attached properties may be set on elements of any type.
    pub attached: bool,
    pub metadata: PropertyMetadata,
}

impl PropertyDescriptor {
    /// `Owner.Name`, for diagnostics.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.owner, self.name)
    }

    /// Shorthand for `metadata.flags`.
    pub fn flags(&self) -> PropertyFlags {
        self.metadata.flags
    }

    /// Whether the value is inherited down the logical tree.
    pub fn inherits(&self) -> bool {
        self.metadata.flags.contains(PropertyFlags::INHERITS)
    }

    /// Check the type tag, then run the validator and coercer.
    ///
    /// Returns the value to store.
    pub fn admit(&self, value: Value) -> Result<Value> {
        let found = value.value_type();
        if !self.value_type.accepts(found) {
            return Err(UiError::TypeMismatch {
                property: self.qualified_name(),
                expected: self.value_type,
                found,
            });
        }
        if let Some(validate) = &self.metadata.validator {
            if !validate(&value) {
                return Err(UiError::ValidationFailed {
                    property: self.qualified_name(),
                });
            }
        }
        match &self.metadata.coercer {
            Some(coerce) => coerce(&value).ok_or_else(|| UiError::ValidationFailed {
                property: self.qualified_name(),
            }),
            None => Ok(value),
        }
    }
}

// ---------------------------------------------------------------------------
// PropertyRegistry
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RegistryInner {
    descriptors: Vec<Arc<PropertyDescriptor>>,
    /// owner -> name -> id.
    by_key: HashMap<&'static str, HashMap<&'static str, PropertyId>>,
}

impl RegistryInner {
    fn find(&self, owner: &str, name: &str) -> Option<PropertyId> {
        self.by_key.get(owner)?.get(name).copied()
    }

    fn index(&mut self, owner: &'static str, name: &'static str, id: PropertyId) {
        self.by_key.entry(owner).or_default().insert(name, id);
    }
}

/// Shared table of property descriptors keyed by `(owner, name)`.
///
/// Registration takes a write lock and normally happens at startup; lookups
/// take a read lock.
pub struct PropertyRegistry {
    inner: RwLock<RegistryInner>,
}

impl PropertyRegistry {
    /// Create a registry pre-populated with the core element properties.
    pub fn new() -> Self {
        let mut inner = RegistryInner::default();
        for (index, entry) in super::core::core_descriptors().into_iter().enumerate() {
            let id = PropertyId(index as u32);
            inner.index(entry.owner, entry.name, id);
            inner.descriptors.push(Arc::new(PropertyDescriptor {
                id,
                name: entry.name,
                owner: entry.owner,
                value_type: entry.value_type,
                attached: entry.attached,
                metadata: entry.metadata,
            }));
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Register a property.
    ///
    /// Re-registering the same `(owner, name)` with the same type is a no-op
    /// returning the existing id; a different type fails with
    /// [`UiError::PropertyConflict`].
    pub fn register(
        &self,
        name: &'static str,
        owner: &'static str,
        value_type: ValueType,
        metadata: PropertyMetadata,
    ) -> Result<PropertyId> {
        self.insert(name, owner, value_type, false, metadata)
    }

    /// Register an attached property, settable on elements of any type.
    pub fn register_attached(
        &self,
        name: &'static str,
        owner: &'static str,
        value_type: ValueType,
        metadata: PropertyMetadata,
    ) -> Result<PropertyId> {
        self.insert(name, owner, value_type, true, metadata)
    }

    /// Register a property and return a typed handle.
    pub fn register_typed<T: PropertyValue>(
        &self,
        name: &'static str,
        owner: &'static str,
        metadata: PropertyMetadata,
    ) -> Result<Property<T>> {
        let id = self.register(name, owner, T::value_type(), metadata)?;
        Ok(Property::from_index(id.0))
    }

    /// Register an attached property and return a typed handle.
    pub fn register_attached_typed<T: PropertyValue>(
        &self,
        name: &'static str,
        owner: &'static str,
        metadata: PropertyMetadata,
    ) -> Result<Property<T>> {
        let id = self.register_attached(name, owner, T::value_type(), metadata)?;
        Ok(Property::from_index(id.0))
    }

    fn insert(
        &self,
        name: &'static str,
        owner: &'static str,
        value_type: ValueType,
        attached: bool,
        metadata: PropertyMetadata,
    ) -> Result<PropertyId> {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.find(owner, name) {
            let desc = &inner.descriptors[existing.0 as usize];
            if desc.value_type == value_type {
                return Ok(existing);
            }
            return Err(UiError::PropertyConflict {
                owner: owner.to_owned(),
                name: name.to_owned(),
                existing: desc.value_type,
                requested: value_type,
            });
        }

        let default_type = metadata.default.value_type();
        if !value_type.accepts(default_type) {
            return Err(UiError::TypeMismatch {
                property: format!("{owner}.{name}"),
                expected: value_type,
                found: default_type,
            });
        }

        let id = PropertyId(inner.descriptors.len() as u32);
        inner.descriptors.push(Arc::new(PropertyDescriptor {
            id,
            name,
            owner,
            value_type,
            attached,
            metadata,
        }));
        inner.index(owner, name, id);
        log::debug!("registered property {owner}.{name} as {id:?}");
        Ok(id)
    }

    /// Descriptor for `id`, or `None` if it was never registered here.
    pub fn get(&self, id: PropertyId) -> Option<Arc<PropertyDescriptor>> {
        self.inner.read().descriptors.get(id.0 as usize).cloned()
    }

    /// Find a descriptor by owner and name.
    pub fn lookup(&self, owner: &str, name: &str) -> Option<PropertyId> {
        self.inner.read().find(owner, name)
    }

    /// Find a typed handle by owner and name, checking the type tag.
    pub fn lookup_typed<T: PropertyValue>(&self, owner: &str, name: &str) -> Option<Property<T>> {
        let id = self.lookup(owner, name)?;
        let desc = self.get(id)?;
        (desc.value_type == T::value_type()).then(|| Property::from_index(id.0))
    }

    /// Number of registered descriptors.
    pub fn len(&self) -> usize {
        self.inner.read().descriptors.len()
    }

    /// Whether no descriptors are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.read().descriptors.is_empty()
    }
}

impl Default for PropertyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("len", &self.len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::core;

    // ── Registration ─────────────────────────────────────────────────

    #[test]
    fn registration_is_idempotent_per_key() {
        let reg = PropertyRegistry::new();
        let a = reg
            .register("Level", "Gauge", ValueType::Float, PropertyMetadata::new(0.0_f32))
            .unwrap();
        let b = reg
            .register("Level", "Gauge", ValueType::Float, PropertyMetadata::new(1.0_f32))
            .unwrap();
        assert_eq!(a, b);
        // The first registration's metadata wins.
        assert_eq!(reg.get(a).unwrap().metadata.default, Value::Float(0.0));
    }

    #[test]
    fn conflicting_type_fails() {
        let reg = PropertyRegistry::new();
        reg.register("Level", "Gauge", ValueType::Float, PropertyMetadata::new(0.0_f32))
            .unwrap();
        let err = reg
            .register("Level", "Gauge", ValueType::Bool, PropertyMetadata::new(false))
            .unwrap_err();
        assert!(matches!(err, UiError::PropertyConflict { .. }));
    }

    #[test]
    fn same_name_different_owner_is_distinct() {
        let reg = PropertyRegistry::new();
        let a = reg
            .register("Value", "A", ValueType::Int, PropertyMetadata::new(0_i64))
            .unwrap();
        let b = reg
            .register("Value", "B", ValueType::Int, PropertyMetadata::new(0_i64))
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn default_must_match_type() {
        let reg = PropertyRegistry::new();
        let err = reg
            .register("Bad", "X", ValueType::Float, PropertyMetadata::new(true))
            .unwrap_err();
        assert!(matches!(err, UiError::TypeMismatch { .. }));
    }

    // ── Lookup ───────────────────────────────────────────────────────

    #[test]
    fn core_properties_have_fixed_ids() {
        let reg = PropertyRegistry::new();
        assert_eq!(reg.lookup("UIElement", "Visibility"), Some(core::VISIBILITY.id()));
        assert_eq!(reg.lookup("UIElement", "Opacity"), Some(core::OPACITY.id()));
        assert_eq!(reg.lookup("FrameworkElement", "DataContext"), Some(core::DATA_CONTEXT.id()));
        assert_eq!(reg.lookup("Popup", "PopupAnimation"), Some(core::POPUP_ANIMATION.id()));
        assert!(reg.get(core::DATA_CONTEXT.id()).unwrap().inherits());
    }

    #[test]
    fn lookup_typed_checks_type() {
        let reg = PropertyRegistry::new();
        assert!(reg.lookup_typed::<f32>("UIElement", "Opacity").is_some());
        assert!(reg.lookup_typed::<bool>("UIElement", "Opacity").is_none());
        assert!(reg.lookup("Nope", "Nothing").is_none());
    }

    #[test]
    fn lookup_finds_runtime_registrations_by_borrowed_names() {
        let reg = PropertyRegistry::new();
        let id = reg
            .register("Header", "Slider", ValueType::String, PropertyMetadata::new(String::new()))
            .unwrap();
        let owner = String::from("Slider");
        let name = String::from("Header");
        assert_eq!(reg.lookup(&owner, &name), Some(id));
        assert!(reg.lookup(&owner, "Value").is_none());
        assert!(reg.lookup("UIElement", &name).is_none());
    }

    // ── Admission ────────────────────────────────────────────────────

    #[test]
    fn admit_runs_validator_then_coercer() {
        let reg = PropertyRegistry::new();
        let id = reg
            .register(
                "Percent",
                "Gauge",
                ValueType::Float,
                PropertyMetadata::new(0.0_f32)
                    .with_validator(|v| v.as_float().is_some_and(|f| !f.is_nan()))
                    .with_coercer(|v| v.as_float().map(|f| Value::Float(f.clamp(0.0, 100.0)))),
            )
            .unwrap();
        let desc = reg.get(id).unwrap();
        assert_eq!(desc.admit(Value::Float(150.0)).unwrap(), Value::Float(100.0));
        assert!(matches!(
            desc.admit(Value::Float(f32::NAN)),
            Err(UiError::ValidationFailed { .. })
        ));
        assert!(matches!(
            desc.admit(Value::Int(1)),
            Err(UiError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn flags_combine() {
        let f = PropertyFlags::AFFECTS_MEASURE | PropertyFlags::INHERITS;
        assert!(f.contains(PropertyFlags::INHERITS));
        assert!(!f.contains(PropertyFlags::AFFECTS_RENDER));
    }
}
