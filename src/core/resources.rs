//=========================================================================
// Resources
//=========================================================================
//
// Type-keyed singleton storage shared between scenes.
//
// Holds what would otherwise be file-level statics: the network session,
// the pending error report, pause state. One value per type.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{Any, TypeId};
use std::collections::HashMap;

//=== Resource Trait ======================================================

/// Anything `Send + 'static` can be stored as a resource.
pub trait Resource: Send + 'static {}

impl<T: Send + 'static> Resource for T {}

//=== Resources ===========================================================

#[derive(Default)]
pub struct Resources {
    values: HashMap<TypeId, Box<dyn Any + Send>>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, returning the previous value of the same type.
    pub fn insert<R: Resource>(&mut self, value: R) -> Option<R> {
        self.values
            .insert(TypeId::of::<R>(), Box::new(value))
            .and_then(|old| old.downcast::<R>().ok())
            .map(|boxed| *boxed)
    }

    pub fn get<R: Resource>(&self) -> Option<&R> {
        self.values
            .get(&TypeId::of::<R>())
            .and_then(|v| v.downcast_ref::<R>())
    }

    pub fn get_mut<R: Resource>(&mut self) -> Option<&mut R> {
        self.values
            .get_mut(&TypeId::of::<R>())
            .and_then(|v| v.downcast_mut::<R>())
    }

    /// Returns the stored value, inserting `R::default()` first if absent.
    pub fn get_or_default<R: Resource + Default>(&mut self) -> &mut R {
        let entry = self
            .values
            .entry(TypeId::of::<R>())
            .or_insert_with(|| Box::new(R::default()));

        match entry.downcast_mut::<R>() {
            Some(value) => value,
            None => unreachable!("resource stored under a foreign TypeId"),
        }
    }

    pub fn remove<R: Resource>(&mut self) -> Option<R> {
        self.values
            .remove(&TypeId::of::<R>())
            .and_then(|v| v.downcast::<R>().ok())
            .map(|boxed| *boxed)
    }

    pub fn contains<R: Resource>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<R>())
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Gold(u32);

    #[derive(Debug, PartialEq)]
    struct Captain(&'static str);

    #[test]
    fn insert_replaces_and_returns_previous() {
        let mut res = Resources::new();
        assert_eq!(res.insert(Gold(10)), None);
        assert_eq!(res.insert(Gold(25)), Some(Gold(10)));
        assert_eq!(res.get::<Gold>(), Some(&Gold(25)));
    }

    #[test]
    fn types_do_not_collide() {
        let mut res = Resources::new();
        res.insert(Gold(1));
        res.insert(Captain("Bonny"));

        assert_eq!(res.get::<Captain>(), Some(&Captain("Bonny")));
        assert!(res.contains::<Gold>());
    }

    #[test]
    fn get_or_default_inserts_once() {
        let mut res = Resources::new();
        res.get_or_default::<Gold>().0 += 5;
        res.get_or_default::<Gold>().0 += 5;
        assert_eq!(res.get::<Gold>(), Some(&Gold(10)));
    }

    #[test]
    fn remove_takes_ownership() {
        let mut res = Resources::new();
        res.insert(Captain("Kidd"));
        assert_eq!(res.remove::<Captain>(), Some(Captain("Kidd")));
        assert!(!res.contains::<Captain>());
        assert_eq!(res.remove::<Captain>(), None);
    }
}
