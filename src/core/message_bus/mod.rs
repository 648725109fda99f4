//=========================================================================
// Message Bus
//=========================================================================
//
// Type-keyed message queues for scene ↔ engine communication.
//
//   producer → push<M>() → HashMap<TypeId, Vec<M>>
//   consumers → read<M>() (shared, any number)
//   owner → clear<M>() / drain<M>() at the tick boundary
//
// Actions, scene transitions and engine commands all travel through
// the bus; scenes never hold references to each other.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{Any, TypeId};
use std::collections::HashMap;

//=== Message Trait =======================================================

/// Anything `Send + 'static` can travel on the bus.
pub trait Message: Send + 'static {}

impl<T: Send + 'static> Message for T {}

//=== Type-Erased Queue ===================================================

trait MessageQueue: Send {
    fn clear_queue(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<M: Message> MessageQueue for Vec<M> {
    fn clear_queue(&mut self) {
        self.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//=== MessageBus ==========================================================

/// Batched inter-system message queues, one `Vec` per message type.
#[derive(Default)]
pub struct MessageBus {
    queues: HashMap<TypeId, Box<dyn MessageQueue>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue<M: Message>(&self) -> Option<&Vec<M>> {
        self.queues
            .get(&TypeId::of::<M>())
            .and_then(|q| q.as_any().downcast_ref::<Vec<M>>())
    }

    fn queue_mut<M: Message>(&mut self) -> Option<&mut Vec<M>> {
        self.queues
            .get_mut(&TypeId::of::<M>())
            .and_then(|q| q.as_any_mut().downcast_mut::<Vec<M>>())
    }

    //--- Message Operations -----------------------------------------------

    pub fn push<M: Message>(&mut self, msg: M) {
        self.queues
            .entry(TypeId::of::<M>())
            .or_insert_with(|| Box::new(Vec::<M>::new()));

        // The entry is keyed by the TypeId of M, so the downcast holds.
        if let Some(queue) = self.queue_mut::<M>() {
            queue.push(msg);
        }
    }

    /// All queued messages of type `M`, oldest first.
    pub fn read<M: Message>(&self) -> &[M] {
        self.queue::<M>().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Most recent message of type `M`.
    pub fn latest<M: Message>(&self) -> Option<&M> {
        self.read::<M>().last()
    }

    /// Removes and returns all messages of type `M`, keeping capacity.
    pub fn drain<M: Message>(&mut self) -> Vec<M> {
        match self.queue_mut::<M>() {
            Some(queue) => queue.drain(..).collect(),
            None => Vec::new(),
        }
    }

    pub fn has_messages<M: Message>(&self) -> bool {
        !self.read::<M>().is_empty()
    }

    pub fn count<M: Message>(&self) -> usize {
        self.read::<M>().len()
    }

    /// Clears type `M` while keeping the allocation for the next tick.
    pub fn clear<M: Message>(&mut self) {
        if let Some(queue) = self.queue_mut::<M>() {
            queue.clear();
        }
    }

    pub fn clear_all(&mut self) {
        for queue in self.queues.values_mut() {
            queue.clear_queue();
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
