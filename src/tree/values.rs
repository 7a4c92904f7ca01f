//! Effective-value resolution, layered writes and change dispatch.
//!
//! Effective value priority: animated, local, template binding, style, then
//! the nearest inheritance ancestor's stored value (for inheritable
//! properties), then the descriptor default.

use std::sync::Arc;

use super::node::{ChangeSubscriber, ElementId};
use super::tree::ElementTree;
use crate::error::{Result, UiError};
use crate::property::{
    Property, PropertyChangedArgs, PropertyDescriptor, PropertyFlags, PropertyId, PropertyValue,
    Value, ValueLevel, ValueType,
};

/// Maximum nesting of change notifications before callbacks are skipped.
pub const MAX_CHANGE_DEPTH: u32 = 64;

/// Where an effective value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueSource {
    Animated,
    Local,
    TemplateBinding,
    Style,
    Inherited,
    Default,
}

impl From<ValueLevel> for ValueSource {
    fn from(level: ValueLevel) -> Self {
        match level {
            ValueLevel::Animated => ValueSource::Animated,
            ValueLevel::Local => ValueSource::Local,
            ValueLevel::TemplateBinding => ValueSource::TemplateBinding,
            ValueLevel::Style => ValueSource::Style,
        }
    }
}

impl ElementTree {
    /// Descriptor for `id` from the shared registry.
    pub fn descriptor(&self, id: PropertyId) -> Result<Arc<PropertyDescriptor>> {
        self.registry().get(id).ok_or(UiError::UnknownProperty(id))
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Effective value of a typed property.
    ///
    /// Returns `T::default()` for stale elements; use
    /// [`try_get`](Self::try_get) to observe errors.
    pub fn get<T: PropertyValue>(&self, id: ElementId, property: Property<T>) -> T {
        self.try_get(id, property).unwrap_or_default()
    }

    /// Effective value of a typed property.
    pub fn try_get<T: PropertyValue>(&self, id: ElementId, property: Property<T>) -> Result<T> {
        let value = self.get_value_as(id, property.id(), T::value_type())?;
        T::from_value(&value).ok_or_else(|| UiError::TypeMismatch {
            property: format!("{property:?}"),
            expected: T::value_type(),
            found: value.value_type(),
        })
    }

    /// Effective value, untyped.
    pub fn get_value(&self, id: ElementId, property: PropertyId) -> Result<Value> {
        self.guard.check("get_value")?;
        let desc = self.descriptor(property)?;
        if !self.contains(id) {
            return Err(UiError::ElementNotFound);
        }
        Ok(self.effective_value(id, &desc))
    }

    /// Effective value, failing with [`UiError::TypeMismatch`] if `expected`
    /// is not the descriptor's type.
    pub fn get_value_as(
        &self,
        id: ElementId,
        property: PropertyId,
        expected: ValueType,
    ) -> Result<Value> {
        let desc = self.descriptor(property)?;
        if desc.value_type != expected {
            return Err(UiError::TypeMismatch {
                property: desc.qualified_name(),
                expected: desc.value_type,
                found: expected,
            });
        }
        self.get_value(id, property)
    }

    /// The value stored at one level, without inheritance or defaults.
    pub fn get_level<T: PropertyValue>(
        &self,
        id: ElementId,
        property: Property<T>,
        level: ValueLevel,
    ) -> Option<T> {
        self.nodes
            .get(id)?
            .values
            .level(property.id(), level)
            .and_then(T::from_value)
    }

    /// Which layer supplies the effective value.
    pub fn value_source(&self, id: ElementId, property: PropertyId) -> Result<ValueSource> {
        let desc = self.descriptor(property)?;
        let data = self.nodes.get(id).ok_or(UiError::ElementNotFound)?;
        if let Some(level) = ValueLevel::ALL
            .into_iter()
            .find(|&l| data.values.level(property, l).is_some())
        {
            return Ok(level.into());
        }
        if desc.inherits() && self.inherited_value(id, property).is_some() {
            return Ok(ValueSource::Inherited);
        }
        Ok(ValueSource::Default)
    }

    pub(crate) fn effective_value(&self, id: ElementId, desc: &PropertyDescriptor) -> Value {
        if let Some(v) = self.nodes.get(id).and_then(|d| d.values.effective(desc.id)) {
            return v.clone();
        }
        if desc.inherits() {
            if let Some(v) = self.inherited_value(id, desc.id) {
                return v;
            }
        }
        desc.metadata.default.clone()
    }

    fn inherited_value(&self, id: ElementId, property: PropertyId) -> Option<Value> {
        let mut cursor = self.inheritance_parent(id);
        while let Some(p) = cursor {
            if let Some(v) = self.nodes.get(p).and_then(|d| d.values.effective(property)) {
                return Some(v.clone());
            }
            cursor = self.inheritance_parent(p);
        }
        None
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Set the local value of a typed property.
    pub fn set_value<T: PropertyValue>(
        &mut self,
        id: ElementId,
        property: Property<T>,
        value: T,
    ) -> Result<()> {
        self.set_level(id, property.id(), ValueLevel::Local, value.into_value())
    }

    /// Set the local value, untyped.
    pub fn set_raw(&mut self, id: ElementId, property: PropertyId, value: Value) -> Result<()> {
        self.set_level(id, property, ValueLevel::Local, value)
    }

    /// Remove the local value.
    pub fn clear_value<T>(&mut self, id: ElementId, property: Property<T>) -> Result<()> {
        self.clear_level(id, property.id(), ValueLevel::Local)
    }

    /// Set the animated value, which overrides every other layer.
    pub fn set_animated_value<T: PropertyValue>(
        &mut self,
        id: ElementId,
        property: Property<T>,
        value: T,
    ) -> Result<()> {
        self.set_level(id, property.id(), ValueLevel::Animated, value.into_value())
    }

    /// Remove the animated value.
    pub fn clear_animated_value<T>(&mut self, id: ElementId, property: Property<T>) -> Result<()> {
        self.clear_level(id, property.id(), ValueLevel::Animated)
    }

    /// Set the style value, the lowest stored layer.
    pub fn set_style_value<T: PropertyValue>(
        &mut self,
        id: ElementId,
        property: Property<T>,
        value: T,
    ) -> Result<()> {
        self.set_level(id, property.id(), ValueLevel::Style, value.into_value())
    }

    /// Remove the style value.
    pub fn clear_style_value<T>(&mut self, id: ElementId, property: Property<T>) -> Result<()> {
        self.clear_level(id, property.id(), ValueLevel::Style)
    }

    /// Store `value` at `level` after type checking, validation and
    /// coercion. Fires change notifications if the effective value changes.
    pub fn set_level(
        &mut self,
        id: ElementId,
        property: PropertyId,
        level: ValueLevel,
        value: Value,
    ) -> Result<()> {
        self.guard.check("set_value")?;
        let desc = self.descriptor(property)?;
        if !self.contains(id) {
            return Err(UiError::ElementNotFound);
        }
        let value = desc.admit(value)?;
        self.apply_level(id, &desc, level, Some(value));
        Ok(())
    }

    /// Remove `level`. Fires change notifications if a lower layer is
    /// promoted to a different effective value.
    pub fn clear_level(&mut self, id: ElementId, property: PropertyId, level: ValueLevel) -> Result<()> {
        self.guard.check("clear_value")?;
        let desc = self.descriptor(property)?;
        if !self.contains(id) {
            return Err(UiError::ElementNotFound);
        }
        self.apply_level(id, &desc, level, None);
        Ok(())
    }

    fn apply_level(
        &mut self,
        id: ElementId,
        desc: &Arc<PropertyDescriptor>,
        level: ValueLevel,
        value: Option<Value>,
    ) {
        let heirs = if desc.inherits() {
            self.inheriting_descendants(id, desc.id)
        } else {
            Vec::new()
        };
        let old = self.effective_value(id, desc);
        let old_heirs: Vec<Value> = heirs.iter().map(|&h| self.effective_value(h, desc)).collect();

        if let Some(data) = self.nodes.get_mut(id) {
            match value {
                Some(v) => data.values.set(desc.id, level, v),
                None => {
                    data.values.clear(desc.id, level);
                }
            }
        }

        let new = self.effective_value(id, desc);
        if new == old {
            return;
        }
        self.notify_changed(id, desc, old, new);

        for (heir, old) in heirs.into_iter().zip(old_heirs) {
            if !self.contains(heir) {
                continue;
            }
            let new = self.effective_value(heir, desc);
            if new != old {
                self.notify_changed(heir, desc, old, new);
            }
        }
    }

    /// Descendants (pre-order) whose effective value of `property` comes from
    /// `id` or above. Subtrees below an element with its own value are
    /// skipped.
    fn inheriting_descendants(&self, id: ElementId, property: PropertyId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.inheritance_children(id).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            let shadowed = self
                .nodes
                .get(current)
                .is_none_or(|d| d.values.has_value(property));
            if shadowed {
                continue;
            }
            out.push(current);
            stack.extend(self.inheritance_children(current).into_iter().rev());
        }
        out
    }

    /// Run invalidation, the descriptor callback, subscribers and template
    /// links for one effective-value change.
    pub(crate) fn notify_changed(
        &mut self,
        id: ElementId,
        desc: &Arc<PropertyDescriptor>,
        old: Value,
        new: Value,
    ) {
        let flags = desc.flags();
        if flags.contains(PropertyFlags::AFFECTS_MEASURE) {
            self.invalidate_measure(id);
        } else if flags.contains(PropertyFlags::AFFECTS_ARRANGE) {
            self.invalidate_arrange(id);
        }
        if flags.contains(PropertyFlags::AFFECTS_RENDER) {
            self.invalidate_visual(id);
        }

        if self.change_depth >= MAX_CHANGE_DEPTH {
            log::warn!(
                "change notification depth limit ({MAX_CHANGE_DEPTH}) hit on {} of {id:?}; callbacks skipped",
                desc.qualified_name()
            );
            return;
        }
        self.change_depth += 1;

        let args = PropertyChangedArgs {
            element: id,
            property: desc.clone(),
            old,
            new,
        };

        if let Some(callback) = desc.metadata.changed.clone() {
            callback(self, &args);
        }

        let subscribers: Vec<ChangeSubscriber> = self
            .nodes
            .get(id)
            .map(|d| d.subscribers.iter().map(|(_, s)| s.clone()).collect())
            .unwrap_or_default();
        for subscriber in subscribers {
            subscriber(self, &args);
        }

        if let Some(links) = self.template_links.get(&(id, desc.id)).cloned() {
            for (child, child_property) in links {
                let result = self.set_level(
                    child,
                    child_property,
                    ValueLevel::TemplateBinding,
                    args.new.clone(),
                );
                if let Err(err) = result {
                    log::warn!("template binding to {child:?} failed: {err}");
                }
            }
        }

        self.change_depth -= 1;
    }
}

// ===========================================================================
// Tests
// ===========================================================================
