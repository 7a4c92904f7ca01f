//! Per-element sparse value storage.

use std::collections::HashMap;

use super::registry::PropertyId;
use super::value::Value;

/// Value layers in priority order, highest first.
///
/// Inherited values and descriptor defaults sit below these and are resolved
/// by the element tree, not stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueLevel {
    Animated,
    Local,
    TemplateBinding,
    Style,
}

impl ValueLevel {
    /// All levels, highest priority first.
    pub const ALL: [ValueLevel; 4] = [
        ValueLevel::Animated,
        ValueLevel::Local,
        ValueLevel::TemplateBinding,
        ValueLevel::Style,
    ];
}

/// The layered values one element holds for one property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueEntry {
    pub animated: Option<Value>,
    pub local: Option<Value>,
    pub template: Option<Value>,
    pub style: Option<Value>,
}

impl ValueEntry {
    fn slot(&self, level: ValueLevel) -> &Option<Value> {
        match level {
            ValueLevel::Animated => &self.animated,
            ValueLevel::Local => &self.local,
            ValueLevel::TemplateBinding => &self.template,
            ValueLevel::Style => &self.style,
        }
    }

    fn slot_mut(&mut self, level: ValueLevel) -> &mut Option<Value> {
        match level {
            ValueLevel::Animated => &mut self.animated,
            ValueLevel::Local => &mut self.local,
            ValueLevel::TemplateBinding => &mut self.template,
            ValueLevel::Style => &mut self.style,
        }
    }

    /// The highest-priority value present, if any.
    pub fn effective(&self) -> Option<&Value> {
        ValueLevel::ALL.iter().find_map(|&l| self.slot(l).as_ref())
    }

    /// Whether no level is set.
    pub fn is_empty(&self) -> bool {
        ValueLevel::ALL.iter().all(|&l| self.slot(l).is_none())
    }
}

/// Sparse map from property id to its layered values.
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    entries: HashMap<PropertyId, ValueEntry>,
}

impl PropertyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The highest-priority stored value for `id`, ignoring inheritance and
    /// defaults.
    pub fn effective(&self, id: PropertyId) -> Option<&Value> {
        self.entries.get(&id).and_then(ValueEntry::effective)
    }

    /// The value at one level.
    pub fn level(&self, id: PropertyId, level: ValueLevel) -> Option<&Value> {
        self.entries.get(&id).and_then(|e| e.slot(level).as_ref())
    }

    /// Store a value at one level. Other levels are untouched.
    pub fn set(&mut self, id: PropertyId, level: ValueLevel, value: Value) {
        *self.entries.entry(id).or_default().slot_mut(level) = Some(value);
    }

    /// Remove one level. Returns the removed value.
    pub fn clear(&mut self, id: PropertyId, level: ValueLevel) -> Option<Value> {
        let entry = self.entries.get_mut(&id)?;
        let removed = entry.slot_mut(level).take();
        if entry.is_empty() {
            self.entries.remove(&id);
        }
        removed
    }

    /// Whether any level is set for `id`.
    pub fn has_value(&self, id: PropertyId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Ids with at least one level set.
    pub fn ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.entries.keys().copied()
    }

    /// Number of properties with stored values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: PropertyId = PropertyId(3);

    #[test]
    fn priority_order() {
        let mut store = PropertyStore::new();
        store.set(P, ValueLevel::Style, Value::Int(1));
        assert_eq!(store.effective(P), Some(&Value::Int(1)));
        store.set(P, ValueLevel::TemplateBinding, Value::Int(2));
        assert_eq!(store.effective(P), Some(&Value::Int(2)));
        store.set(P, ValueLevel::Local, Value::Int(3));
        assert_eq!(store.effective(P), Some(&Value::Int(3)));
        store.set(P, ValueLevel::Animated, Value::Int(4));
        assert_eq!(store.effective(P), Some(&Value::Int(4)));
    }

    #[test]
    fn local_write_keeps_lower_levels() {
        let mut store = PropertyStore::new();
        store.set(P, ValueLevel::Style, Value::Int(1));
        store.set(P, ValueLevel::Local, Value::Int(2));
        store.clear(P, ValueLevel::Local);
        assert_eq!(store.effective(P), Some(&Value::Int(1)));
    }

    #[test]
    fn clearing_last_level_drops_entry() {
        let mut store = PropertyStore::new();
        store.set(P, ValueLevel::Local, Value::Bool(true));
        assert_eq!(store.clear(P, ValueLevel::Local), Some(Value::Bool(true)));
        assert!(!store.has_value(P));
        assert!(store.is_empty());
        assert_eq!(store.clear(P, ValueLevel::Local), None);
    }
}
