//! Data bindings, control templates and template bindings.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::node::ElementId;
use super::tree::ElementTree;
use crate::error::{Result, UiError};
use crate::property::core::DATA_CONTEXT;
use crate::property::{Object, PropertyId, PropertyValue, Value, ValueLevel};

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

type Converter = Arc<dyn Fn(Option<&Object>) -> Option<Value> + Send + Sync>;

/// One-way binding from an element's effective data context to one of its
/// properties.
///
/// The converter returns `None` when the data context cannot supply a value;
/// the bound property's local value is then cleared.
#[derive(Clone)]
pub struct Binding {
    convert: Converter,
}

impl Binding {
    /// A binding with an arbitrary converter.
    pub fn new(convert: impl Fn(Option<&Object>) -> Option<Value> + Send + Sync + 'static) -> Self {
        Self {
            convert: Arc::new(convert),
        }
    }

    /// Bind to a field of a data context of concrete type `S`.
    pub fn path<S, V>(select: impl Fn(&S) -> V + Send + Sync + 'static) -> Self
    where
        S: Any + Send + Sync,
        V: PropertyValue,
    {
        Self::new(move |ctx| {
            ctx.and_then(|o| o.downcast_ref::<S>())
                .map(|s| select(s).into_value())
        })
    }

    /// Evaluate against a data context.
    pub fn evaluate(&self, context: Option<&Object>) -> Option<Value> {
        (self.convert)(context)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Binding")
    }
}

// ---------------------------------------------------------------------------
// ControlTemplate
// ---------------------------------------------------------------------------

/// A detached prototype subtree, instantiated by
/// [`ElementTree::apply_template`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlTemplate {
    root: ElementId,
}

impl ControlTemplate {
    /// Wrap a prototype root. The prototype must stay detached.
    pub fn new(root: ElementId) -> Self {
        Self { root }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }
}

impl ElementTree {
    // ── Bindings ─────────────────────────────────────────────────────

    /// Bind `property` on `id` to its data context. The binding is evaluated
    /// immediately and again whenever the effective data context changes.
    pub fn set_binding(&mut self, id: ElementId, property: PropertyId, binding: Binding) -> Result<()> {
        self.guard.check("set_binding")?;
        self.descriptor(property)?;
        let data = self.nodes.get_mut(id).ok_or(UiError::ElementNotFound)?;
        data.bindings.insert(property, binding.clone());
        self.apply_binding(id, property, &binding)
    }

    /// Remove a binding. The value it last wrote stays in place.
    pub fn clear_binding(&mut self, id: ElementId, property: PropertyId) -> bool {
        self.nodes
            .get_mut(id)
            .is_some_and(|d| d.bindings.remove(&property).is_some())
    }

    /// Re-evaluate every binding on `id`.
    pub(crate) fn refresh_bindings(&mut self, id: ElementId) {
        let bindings: Vec<(PropertyId, Binding)> = match self.nodes.get(id) {
            Some(data) if !data.bindings.is_empty() => data
                .bindings
                .iter()
                .map(|(p, b)| (*p, b.clone()))
                .collect(),
            _ => return,
        };
        for (property, binding) in bindings {
            if let Err(err) = self.apply_binding(id, property, &binding) {
                log::warn!("binding on {id:?} failed: {err}");
            }
        }
    }

    /// Re-evaluate bindings in the subtree at `id`. Run after structural
    /// changes, which may change inherited data contexts without firing
    /// change notifications.
    pub(crate) fn refresh_bindings_in_subtree(&mut self, id: ElementId) {
        for element in self.walk_logical(id) {
            self.refresh_bindings(element);
        }
    }

    fn apply_binding(&mut self, id: ElementId, property: PropertyId, binding: &Binding) -> Result<()> {
        let context = self.get(id, DATA_CONTEXT);
        match binding.evaluate(context.as_ref()) {
            Some(value) => self.set_level(id, property, ValueLevel::Local, value),
            None => self.clear_level(id, property, ValueLevel::Local),
        }
    }

    // ── Templates ────────────────────────────────────────────────────

    /// Deep-copy the subtree at `source`: widget, stored values, handlers,
    /// bindings, owned visual children and logical-only children. The copy
    /// is detached.
    pub fn clone_subtree(&mut self, source: ElementId) -> Result<ElementId> {
        self.guard.check("clone_subtree")?;
        let data = self.nodes.get(source).ok_or(UiError::ElementNotFound)?;
        let widget = data
            .widget
            .as_ref()
            .map(|w| w.clone_widget())
            .ok_or_else(|| UiError::Widget(format!("{} is busy and cannot be cloned", data.type_name)))?;
        let values = data.values.clone();
        let handlers = data.handlers.clone();
        let bindings = data.bindings.clone();
        let template_binds = data.template_binds.clone();

        let copy = self.create_boxed(widget);
        if let Some(target) = self.nodes.get_mut(copy) {
            target.values = values;
            target.handlers = handlers;
            target.bindings = bindings;
            target.template_binds = template_binds;
        }

        for child in self.visual_children(source).to_vec() {
            let owned = self.nodes.get(child).is_some_and(|d| d.owned);
            if owned {
                let child_copy = self.clone_subtree(child)?;
                self.append_child(copy, child_copy);
            }
        }
        for child in self.logical_children(source).to_vec() {
            if self.visual_parent(child).is_none() {
                let child_copy = self.clone_subtree(child)?;
                self.add_logical_child(copy, child_copy);
            }
        }
        Ok(copy)
    }

    /// Instantiate `template` under `templated_parent`.
    ///
    /// The clone becomes an owned, visual-only child of `templated_parent`,
    /// every cloned element records it as templated parent, the clone root
    /// anchors a fresh name scope, and declared template bindings start
    /// following their source properties.
    pub fn apply_template(
        &mut self,
        templated_parent: ElementId,
        template: &ControlTemplate,
    ) -> Result<ElementId> {
        if !self.contains(templated_parent) {
            return Err(UiError::ElementNotFound);
        }
        let root = self.clone_subtree(template.root())?;
        let members = self.walk_logical(root);
        for &member in &members {
            if let Some(data) = self.nodes.get_mut(member) {
                data.templated_parent = Some(templated_parent);
            }
        }
        self.create_name_scope(root);
        let index = self.visual_children(templated_parent).len();
        self.link_visual(templated_parent, index, root, true);

        for member in members {
            let binds = self
                .nodes
                .get(member)
                .map(|d| d.template_binds.clone())
                .unwrap_or_default();
            for (own, source) in binds {
                self.link_template(member, own, source)?;
            }
        }
        log::debug!("applied template to {templated_parent:?} (root {root:?})");
        Ok(root)
    }

    /// Mirror `source_property` of `child`'s templated parent into
    /// `child_property` at the template-binding level.
    ///
    /// On a template prototype (no templated parent yet) the link is
    /// recorded and activated by each [`apply_template`](Self::apply_template).
    pub fn template_bind(
        &mut self,
        child: ElementId,
        child_property: PropertyId,
        source_property: PropertyId,
    ) -> Result<()> {
        self.guard.check("template_bind")?;
        let target = self.descriptor(child_property)?;
        let source = self.descriptor(source_property)?;
        if target.value_type != source.value_type {
            return Err(UiError::TypeMismatch {
                property: target.qualified_name(),
                expected: target.value_type,
                found: source.value_type,
            });
        }
        let data = self.nodes.get_mut(child).ok_or(UiError::ElementNotFound)?;
        if !data.template_binds.contains(&(child_property, source_property)) {
            data.template_binds.push((child_property, source_property));
        }
        if data.templated_parent.is_some() {
            self.link_template(child, child_property, source_property)?;
        }
        Ok(())
    }

    fn link_template(&mut self, child: ElementId, own: PropertyId, source: PropertyId) -> Result<()> {
        let Some(parent) = self.templated_parent(child) else {
            return Ok(());
        };
        let targets = self.template_links.entry((parent, source)).or_default();
        if !targets.contains(&(child, own)) {
            targets.push((child, own));
        }
        let value = self.get_value(parent, source)?;
        self.set_level(child, own, ValueLevel::TemplateBinding, value)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
