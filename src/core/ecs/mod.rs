//=========================================================================
// Entity Arena
//=========================================================================
//
// Generation-checked entity keys with one typed store per component.
//
//   World
//     ├─ entities: SlotMap<Entity, EntityState>
//     └─ stores:   HashMap<TypeId, SecondaryMap<Entity, T>>
//
// A stale key (entity destroyed, slot reused) never resolves, so
// components may keep `Entity` back-references (camera target, shadow
// parent) without owning them.
//
//=========================================================================

//=== Module Declarations =================================================

mod world;

//=== Public API ==========================================================

pub use world::{EntityBuilder, World};

//=== Entity Key ==========================================================

slotmap::new_key_type! {
    /// Handle to an entity in a [`World`].
    pub struct Entity;
}

//=== Component Trait =====================================================

/// Plain data attached to entities. Implemented for every `Send + 'static` type.
pub trait Component: Send + 'static {}

impl<T: Send + 'static> Component for T {}
