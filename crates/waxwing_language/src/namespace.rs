//! Lexical namespaces.
//!
//! A namespace is a mapping from names to values with a parent pointer.
//! Lookup walks to the root; binding is always local to the frame it is
//! called on. Namespaces form a tree following function/body scopes, rooted
//! at the shared standard namespace. Binding is an emit-time operation; a
//! running program has no primitive that mutates a namespace.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

/// A shared namespace handle.
pub type NamespaceRef = Rc<Namespace>;

/// A chain link of name-to-value bindings.
#[derive(Debug, Default)]
pub struct Namespace {
    parent: Option<NamespaceRef>,
    bindings: RefCell<HashMap<String, Value>>,
}

impl Namespace {
    /// Creates a root namespace with no parent.
    #[must_use]
    pub fn root() -> NamespaceRef {
        Rc::new(Self::default())
    }

    /// Creates a child namespace whose lookups fall through to `parent`.
    #[must_use]
    pub fn child(parent: &NamespaceRef) -> NamespaceRef {
        Rc::new(Self {
            parent: Some(Rc::clone(parent)),
            bindings: RefCell::new(HashMap::new()),
        })
    }

    /// Looks up a name, walking the parent chain.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.lookup(name))
    }

    /// Binds a name locally, shadowing any parent binding of the same name.
    pub fn bind(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }
}
