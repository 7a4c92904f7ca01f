//! Name scopes: per-subtree name to element indexes.

use std::collections::HashMap;

use super::node::ElementId;
use super::tree::ElementTree;
use crate::property::core::NAME;

/// A name to element index anchored on one element.
#[derive(Debug, Clone, Default)]
pub struct NameScope {
    names: HashMap<String, ElementId>,
}

impl NameScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`. Returns `false` and leaves the scope unchanged if the
    /// name is already taken.
    pub fn register(&mut self, name: &str, id: ElementId) -> bool {
        if name.is_empty() || self.names.contains_key(name) {
            return false;
        }
        self.names.insert(name.to_owned(), id);
        true
    }

    /// Remove `name`. Returns the element it pointed to.
    pub fn unregister(&mut self, name: &str) -> Option<ElementId> {
        self.names.remove(name)
    }

    /// Move `id` from `old` to `new`, replacing whatever `new` pointed to.
    pub fn update(&mut self, old: &str, new: &str, id: ElementId) {
        if self.names.get(old) == Some(&id) {
            self.names.remove(old);
        }
        if !new.is_empty() {
            self.names.insert(new.to_owned(), id);
        }
    }

    pub fn find(&self, name: &str) -> Option<ElementId> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl ElementTree {
    /// Anchor a name scope on `id` if it has none. Names already set in the
    /// subtree below it are registered into the new scope.
    pub fn create_name_scope(&mut self, id: ElementId) {
        let Some(data) = self.nodes.get_mut(id) else {
            return;
        };
        if data.name_scope.is_some() {
            return;
        }
        data.name_scope = Some(NameScope::new());
        let members = self.scope_members(id);
        if let Some(scope) = self.nodes.get_mut(id).and_then(|d| d.name_scope.as_mut()) {
            for (name, member) in members {
                scope.register(&name, member);
            }
        }
    }

    /// Whether `id` anchors a name scope.
    pub fn has_name_scope(&self, id: ElementId) -> bool {
        self.nodes.get(id).is_some_and(|d| d.name_scope.is_some())
    }

    /// Nearest element at or above `id`, along inheritance parents, that
    /// anchors a scope.
    pub fn find_nearest_name_scope(&self, id: ElementId) -> Option<ElementId> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if self.has_name_scope(current) {
                return Some(current);
            }
            cursor = self.inheritance_parent(current);
        }
        None
    }

    /// Look `name` up from `from`: the nearest scope first, then a recursive
    /// search of the logical subtree by `Name`.
    pub fn find_name(&self, from: ElementId, name: &str) -> Option<ElementId> {
        if name.is_empty() {
            return None;
        }
        if let Some(anchor) = self.find_nearest_name_scope(from) {
            let hit = self
                .nodes
                .get(anchor)
                .and_then(|d| d.name_scope.as_ref())
                .and_then(|s| s.find(name));
            if let Some(id) = hit.filter(|&id| self.contains(id)) {
                return Some(id);
            }
        }
        self.walk_logical(from)
            .into_iter()
            .find(|&e| self.get(e, NAME) == name)
    }

    /// Called by the `Name` change callback.
    pub(crate) fn name_changed(&mut self, id: ElementId, old: &str, new: &str) {
        let Some(anchor) = self.registration_scope(id) else {
            return;
        };
        if let Some(scope) = self.nodes.get_mut(anchor).and_then(|d| d.name_scope.as_mut()) {
            scope.update(old, new, id);
        }
    }

    /// Register every name in the subtree at `id` with the scopes it now
    /// belongs to. Run after `id` is attached.
    pub(crate) fn register_subtree_names(&mut self, id: ElementId) {
        for (anchor, name, member) in self.subtree_registrations(id) {
            if let Some(scope) = self.nodes.get_mut(anchor).and_then(|d| d.name_scope.as_mut()) {
                if !scope.register(&name, member) {
                    log::debug!("name {name:?} already registered; keeping the existing entry");
                }
            }
        }
    }

    /// Undo [`register_subtree_names`](Self::register_subtree_names). Run
    /// before `id` is detached.
    pub(crate) fn unregister_subtree_names(&mut self, id: ElementId) {
        for (anchor, name, member) in self.subtree_registrations(id) {
            if let Some(scope) = self.nodes.get_mut(anchor).and_then(|d| d.name_scope.as_mut()) {
                if scope.find(&name) == Some(member) {
                    scope.unregister(&name);
                }
            }
        }
    }

    /// The scope `id`'s own name lives in. A scope anchored on `id` holds the
    /// names below it, so the search starts at the parent in that case.
    fn registration_scope(&self, id: ElementId) -> Option<ElementId> {
        if self.has_name_scope(id) {
            self.inheritance_parent(id)
                .and_then(|p| self.find_nearest_name_scope(p))
        } else {
            self.find_nearest_name_scope(id)
        }
    }

    /// `(anchor, name, element)` for every named element in the subtree at
    /// `id` whose scope lies outside the subtree.
    fn subtree_registrations(&self, id: ElementId) -> Vec<(ElementId, String, ElementId)> {
        let Some(outer) = self.registration_scope(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let name = self.get(current, NAME);
            if !name.is_empty() {
                out.push((outer, name, current));
            }
            // A nested scope keeps its own names.
            if !self.has_name_scope(current) {
                stack.extend(self.inheritance_children(current).into_iter().rev());
            }
        }
        out
    }

    /// Named elements below `anchor` that belong to its scope.
    fn scope_members(&self, anchor: ElementId) -> Vec<(String, ElementId)> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.inheritance_children(anchor).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            let name = self.get(current, NAME);
            if !name.is_empty() {
                out.push((name, current));
            }
            if !self.has_name_scope(current) {
                stack.extend(self.inheritance_children(current).into_iter().rev());
            }
        }
        out
    }
}

// ===========================================================================
// Tests
// ===========================================================================
