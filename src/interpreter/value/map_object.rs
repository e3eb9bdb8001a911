use std::{cell::RefCell, rc::Rc};

use crate::interpreter::value::core::Value;

/// A shared handle to a map object. Identity (`Rc::ptr_eq`) is the map's
/// identity for `==` and for cycle detection.
pub type MapHandle = Rc<RefCell<MapObject>>;

/// A map: insertion-ordered key/value pairs plus two inheritance links.
///
/// `instance_of` points at the map this one was instantiated from (set by
/// calling a map as a constructor); `inherits_from` is an ordered list of
/// additional parents. Both feed [`lookup_chain`]; neither is ever written
/// through — member assignment always lands in the own `entries`.
#[derive(Debug, Default)]
pub struct MapObject {
    /// Own key/value pairs, in insertion order.
    pub entries:       Vec<(String, Value)>,
    /// The map this one is an instance of, if any.
    pub instance_of:   Option<MapHandle>,
    /// Additional parents, searched in order after `instance_of`.
    pub inherits_from: Vec<MapHandle>,
}

impl MapObject {
    /// A fresh empty map handle.
    #[must_use]
    pub fn new_handle() -> MapHandle {
        Rc::new(RefCell::new(Self::default()))
    }

    /// A fresh instance of `parent`.
    #[must_use]
    pub fn instance_handle(parent: &MapHandle) -> MapHandle {
        Rc::new(RefCell::new(Self { entries:       Vec::new(),
                                    instance_of:   Some(Rc::clone(parent)),
                                    inherits_from: Vec::new(), }))
    }

    /// Looks up an own key, ignoring inheritance.
    #[must_use]
    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Whether an own key exists.
    #[must_use]
    pub fn has_own(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Writes an own key, replacing in place or appending.
    pub fn set_own(&mut self, key: &str, value: Value) {
        for (k, v) in &mut self.entries {
            if k == key {
                *v = value;
                return;
            }
        }
        self.entries.push((key.to_string(), value));
    }

    /// Removes an own key, returning its value.
    pub fn delete_own(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }
}

/// Resolves a key through a map's inheritance graph: own entries first,
/// then the `instance_of` link, then each `inherits_from` parent in order,
/// depth first.
///
/// The graph may be cyclic; a visited set of map pointers guarantees
/// termination. The search is iterative over an explicit worklist.
#[must_use]
pub fn lookup_chain(handle: &MapHandle, key: &str) -> Option<Value> {
    let mut visited: Vec<*const RefCell<MapObject>> = Vec::new();
    let mut worklist: Vec<MapHandle> = vec![Rc::clone(handle)];

    while let Some(current) = worklist.pop() {
        let pointer = Rc::as_ptr(&current);
        if visited.contains(&pointer) {
            continue;
        }
        visited.push(pointer);

        let map = current.borrow();
        if let Some(value) = map.get_own(key) {
            return Some(value);
        }
        // Parents are pushed in reverse so the worklist pops them in
        // declaration order, instance_of first.
        for parent in map.inherits_from.iter().rev() {
            worklist.push(Rc::clone(parent));
        }
        if let Some(parent) = &map.instance_of {
            worklist.push(Rc::clone(parent));
        }
    }
    None
}

/// Whether `handle` is an instance of `parent` (directly or transitively
/// through `instance_of` links).
#[must_use]
pub fn instance_of(handle: &MapHandle, parent: &MapHandle) -> bool {
    let mut visited: Vec<*const RefCell<MapObject>> = Vec::new();
    let mut current = Rc::clone(handle);
    loop {
        let pointer = Rc::as_ptr(&current);
        if visited.contains(&pointer) {
            return false;
        }
        visited.push(pointer);

        let next = match &current.borrow().instance_of {
            Some(link) if Rc::ptr_eq(link, parent) => return true,
            Some(link) => Rc::clone(link),
            None => return false,
        };
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{MapObject, instance_of, lookup_chain};
    use crate::interpreter::value::core::Value;

    #[test]
    fn own_entries_shadow_parents() {
        let parent = MapObject::new_handle();
        parent.borrow_mut().set_own("x", Value::from_real(1.0));
        let child = MapObject::instance_handle(&parent);

        assert!(lookup_chain(&child, "x").unwrap().equals(&Value::from_real(1.0)));
        child.borrow_mut().set_own("x", Value::from_real(2.0));
        assert!(lookup_chain(&child, "x").unwrap().equals(&Value::from_real(2.0)));
        // The parent is untouched.
        assert!(parent.borrow().get_own("x").unwrap().equals(&Value::from_real(1.0)));
    }

    #[test]
    fn cyclic_inheritance_terminates() {
        let a = MapObject::new_handle();
        let b = MapObject::new_handle();
        a.borrow_mut().inherits_from.push(Rc::clone(&b));
        b.borrow_mut().inherits_from.push(Rc::clone(&a));

        assert!(lookup_chain(&a, "missing").is_none());
    }

    #[test]
    fn instance_chains() {
        let base = MapObject::new_handle();
        let mid = MapObject::instance_handle(&base);
        let leaf = MapObject::instance_handle(&mid);

        assert!(instance_of(&leaf, &base));
        assert!(instance_of(&leaf, &mid));
        assert!(!instance_of(&base, &leaf));
    }

    #[test]
    fn parents_searched_in_order() {
        let first = MapObject::new_handle();
        let second = MapObject::new_handle();
        first.borrow_mut().set_own("k", Value::from_real(1.0));
        second.borrow_mut().set_own("k", Value::from_real(2.0));

        let child = MapObject::new_handle();
        child.borrow_mut().inherits_from.push(first);
        child.borrow_mut().inherits_from.push(second);

        assert!(lookup_chain(&child, "k").unwrap().equals(&Value::from_real(1.0)));
    }
}
