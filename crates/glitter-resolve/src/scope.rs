//! The resolver's scope stack: one `Rib` per open block/function/loop,
//! tracking each binding's declare/define state. Adapted from the
//! teacher's rib-based scope tree, simplified to a plain stack — the
//! resolver only ever needs the *distance* from the innermost rib to the
//! rib holding a binding, never random access to an arbitrary past rib.

use glitter_util::FxHashMap;

/// A binding's state within a rib, per the two-phase declare/define rule:
/// a name is `Declared` while its own initializer is being resolved (so a
/// self-reference can be caught) and `Defined` once that initializer has
/// been evaluated and the name is safe to reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingState {
    Declared,
    Defined,
}

/// A single open scope. The global (outermost) rib is never pushed as a
/// `Rib` — names that bottom out past the last rib resolve to
/// `Resolution::Global` rather than a rib index, matching the spec's
/// `scopeDistance == -1` convention.
#[derive(Default)]
pub struct Rib {
    bindings: FxHashMap<String, BindingState>,
}

/// Stack of open local scopes, plus the global rib that spec §4.3 says is
/// "pushed at construction". The global rib is modeled separately rather
/// than as `ribs[0]` because it behaves differently in two ways: it never
/// participates in distance counting (anything living there, or nothing
/// at all, resolves to `Resolution::Global`) and it is exempt from the
/// duplicate-redeclaration error.
#[derive(Default)]
pub struct ScopeStack {
    ribs: Vec<Rib>,
    global: Rib,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self) {
        self.ribs.push(Rib::default());
    }

    pub fn pop(&mut self) {
        self.ribs.pop();
    }

    pub fn is_global(&self) -> bool {
        self.ribs.is_empty()
    }

    /// Declares `name` in the innermost scope (local or global). Returns
    /// the previous state if `name` was already bound there — in a local
    /// scope that's a duplicate-declaration error; at global scope it's
    /// permitted and the caller ignores it.
    pub fn declare(&mut self, name: &str) -> Option<BindingState> {
        let rib = self.ribs.last_mut().unwrap_or(&mut self.global);
        rib.bindings.insert(name.to_string(), BindingState::Declared)
    }

    pub fn define(&mut self, name: &str) {
        let rib = self.ribs.last_mut().unwrap_or(&mut self.global);
        rib.bindings.insert(name.to_string(), BindingState::Defined);
    }

    /// Looks up `name` starting from the innermost local rib. Returns the
    /// distance to the rib holding it (0 = innermost) and its state, or
    /// `None` if no local rib binds it.
    pub fn resolve_local(&self, name: &str) -> Option<(u32, BindingState)> {
        for (distance, rib) in self.ribs.iter().rev().enumerate() {
            if let Some(state) = rib.bindings.get(name) {
                return Some((distance as u32, *state));
            }
        }
        None
    }

    /// Looks up `name` in the global rib only, used to detect a
    /// self-reference in a global variable's own initializer.
    pub fn resolve_global(&self, name: &str) -> Option<BindingState> {
        self.global.bindings.get(name).copied()
    }
}
