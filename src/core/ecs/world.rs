//=========================================================================
// World
//=========================================================================
//
// Entity lifecycle:
//   spawn() → alive → destroy() → pending → maintain() → gone
//
// Pending entities keep their components until maintain() so systems
// running later in the same tick (matrix release, shadows) can still
// read them.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{Any, TypeId};
use std::collections::HashMap;

use log::{debug, warn};
use slotmap::{SecondaryMap, SlotMap};

//=== Internal Dependencies ===============================================

use super::{Component, Entity};

//=== Type-Erased Store ===================================================

trait ComponentStore: Send {
    fn remove_entity(&mut self, entity: Entity);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ComponentStore for SecondaryMap<Entity, T> {
    fn remove_entity(&mut self, entity: Entity) {
        self.remove(entity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//=== EntityState =========================================================

#[derive(Debug, Default, Clone, Copy)]
struct EntityState {
    pending_destroy: bool,
}

//=== World ===============================================================

#[derive(Default)]
pub struct World {
    entities: SlotMap<Entity, EntityState>,
    stores: HashMap<TypeId, Box<dyn ComponentStore>>,
    pending: Vec<Entity>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Entity Lifecycle -------------------------------------------------

    pub fn spawn(&mut self) -> Entity {
        self.entities.insert(EntityState::default())
    }

    /// Spawns an entity and returns a builder for attaching components.
    pub fn build(&mut self) -> EntityBuilder<'_> {
        let entity = self.spawn();
        EntityBuilder { world: self, entity }
    }

    /// Marks `entity` for removal at the next [`World::maintain`].
    ///
    /// Returns false for stale keys and entities already pending.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        match self.entities.get_mut(entity) {
            Some(state) if !state.pending_destroy => {
                state.pending_destroy = true;
                self.pending.push(entity);
                true
            }
            _ => false,
        }
    }

    /// True if the key resolves and the entity is not pending destruction.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities
            .get(entity)
            .is_some_and(|state| !state.pending_destroy)
    }

    /// True if the key still resolves, pending or not.
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity)
    }

    /// Entities destroyed since the last maintain, in destruction order.
    pub fn pending(&self) -> &[Entity] {
        &self.pending
    }

    /// Removes pending entities and all their components.
    pub fn maintain(&mut self) -> Vec<Entity> {
        let removed = std::mem::take(&mut self.pending);
        for &entity in &removed {
            for store in self.stores.values_mut() {
                store.remove_entity(entity);
            }
            self.entities.remove(entity);
        }

        if !removed.is_empty() {
            debug!("World maintenance removed {} entities", removed.len());
        }
        removed
    }

    /// Number of entities, including pending ones.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    //--- Component Access -------------------------------------------------

    fn store<T: Component>(&self) -> Option<&SecondaryMap<Entity, T>> {
        self.stores
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref::<SecondaryMap<Entity, T>>())
    }

    fn store_mut<T: Component>(&mut self) -> Option<&mut SecondaryMap<Entity, T>> {
        self.stores
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut::<SecondaryMap<Entity, T>>())
    }

    /// Attaches `component`, returning the component it replaced.
    ///
    /// Components offered to stale entities are dropped with a warning.
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> Option<T> {
        if !self.entities.contains_key(entity) {
            warn!(
                "Dropping {} for stale entity {:?}",
                std::any::type_name::<T>(),
                entity
            );
            return None;
        }

        self.stores
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(SecondaryMap::<Entity, T>::new()));

        self.store_mut::<T>()
            .and_then(|store| store.insert(entity, component))
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.store::<T>().and_then(|store| store.get(entity))
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.store_mut::<T>().and_then(|store| store.get_mut(entity))
    }

    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.store_mut::<T>().and_then(|store| store.remove(entity))
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Iterates every `(entity, component)` pair of type `T`.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.store::<T>().into_iter().flat_map(|store| store.iter())
    }

    pub fn iter_mut<T: Component>(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.store_mut::<T>()
            .into_iter()
            .flat_map(|store| store.iter_mut())
    }

    /// Collects the entities carrying `T`, so callers can mutate the
    /// world while walking them.
    pub fn entities_with<T: Component>(&self) -> Vec<Entity> {
        self.iter::<T>().map(|(entity, _)| entity).collect()
    }
}

//=== EntityBuilder =======================================================

/// Fluent entity assembly: `world.build().with(a).with(b).id()`.
pub struct EntityBuilder<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl EntityBuilder<'_> {
    pub fn with<T: Component>(self, component: T) -> Self {
        self.world.insert(self.entity, component);
        self
    }

    pub fn id(self) -> Entity {
        self.entity
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Hull(u32);

    #[derive(Debug, PartialEq)]
    struct Flag(&'static str);

    #[test]
    fn builder_attaches_components() {
        let mut world = World::new();
        let ship = world.build().with(Hull(100)).with(Flag("jolly roger")).id();

        assert_eq!(world.get::<Hull>(ship), Some(&Hull(100)));
        assert_eq!(world.get::<Flag>(ship), Some(&Flag("jolly roger")));
        assert!(world.is_alive(ship));
    }

    #[test]
    fn destroyed_entity_readable_until_maintain() {
        let mut world = World::new();
        let ship = world.build().with(Hull(3)).id();

        assert!(world.destroy(ship));
        assert!(!world.destroy(ship));
        assert!(!world.is_alive(ship));
        assert!(world.contains(ship));
        assert_eq!(world.get::<Hull>(ship), Some(&Hull(3)));
        assert_eq!(world.pending(), &[ship]);

        assert_eq!(world.maintain(), vec![ship]);
        assert!(!world.contains(ship));
        assert_eq!(world.get::<Hull>(ship), None);
        assert!(world.pending().is_empty());
    }

    #[test]
    fn stale_keys_do_not_resolve_after_slot_reuse() {
        let mut world = World::new();
        let old = world.build().with(Hull(1)).id();
        world.destroy(old);
        world.maintain();

        let new = world.build().with(Hull(2)).id();
        assert_ne!(old, new);
        assert!(!world.is_alive(old));
        assert_eq!(world.get::<Hull>(old), None);
        assert_eq!(world.get::<Hull>(new), Some(&Hull(2)));
    }

    #[test]
    fn insert_on_stale_entity_is_dropped() {
        let mut world = World::new();
        let ghost = world.spawn();
        world.destroy(ghost);
        world.maintain();

        assert_eq!(world.insert(ghost, Hull(9)), None);
        assert_eq!(world.iter::<Hull>().count(), 0);
    }

    #[test]
    fn insert_returns_replaced_component() {
        let mut world = World::new();
        let ship = world.spawn();
        assert_eq!(world.insert(ship, Hull(1)), None);
        assert_eq!(world.insert(ship, Hull(2)), Some(Hull(1)));
    }

    #[test]
    fn iteration_and_mutation() {
        let mut world = World::new();
        let a = world.build().with(Hull(10)).id();
        let b = world.build().with(Hull(20)).with(Flag("b")).id();
        world.build().with(Flag("c"));

        for (_, hull) in world.iter_mut::<Hull>() {
            hull.0 += 1;
        }

        let mut hulls: Vec<u32> = world.iter::<Hull>().map(|(_, h)| h.0).collect();
        hulls.sort();
        assert_eq!(hulls, vec![11, 21]);

        let mut with_hull = world.entities_with::<Hull>();
        with_hull.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(with_hull, expected);
        assert_eq!(world.iter::<String>().count(), 0);
    }

    #[test]
    fn remove_detaches_single_component() {
        let mut world = World::new();
        let ship = world.build().with(Hull(5)).with(Flag("x")).id();

        assert_eq!(world.remove::<Flag>(ship), Some(Flag("x")));
        assert!(!world.has::<Flag>(ship));
        assert!(world.has::<Hull>(ship));
    }
}
