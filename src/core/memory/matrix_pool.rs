//=========================================================================
// Matrix Pool
//=========================================================================
//
// Fixed-capacity slab of 4x4 transform matrices with a stack free list.
//
//   allocate()   → pop top of free list        O(1)
//   deallocate() → push index back, reset slot  O(1)
//
// Components store a `MatrixIndex` instead of the matrix itself, so the
// component stores may move their data around freely while the renderer
// keeps reading matrices at stable addresses. The backing slice is
// allocated once and never grows.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Mat4;
use log::trace;

//=== Constants ===========================================================

/// Number of matrices a pool can hand out at once.
pub const MATRIX_POOL_CAPACITY: usize = 1024;

//=== MatrixIndex =========================================================

/// Index of a slot in a [`MatrixPool`]. Invalid once deallocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatrixIndex(u16);

impl MatrixIndex {
    pub fn get(self) -> usize {
        usize::from(self.0)
    }
}

//=== MatrixPool ==========================================================

pub struct MatrixPool {
    matrices: Box<[Mat4]>,
    live: Box<[bool]>,
    free: Vec<MatrixIndex>,
}

impl MatrixPool {
    pub fn new() -> Self {
        // Reversed so the first allocation hands out slot 0.
        let free = (0..MATRIX_POOL_CAPACITY as u16)
            .rev()
            .map(MatrixIndex)
            .collect();

        Self {
            matrices: vec![Mat4::IDENTITY; MATRIX_POOL_CAPACITY].into_boxed_slice(),
            live: vec![false; MATRIX_POOL_CAPACITY].into_boxed_slice(),
            free,
        }
    }

    /// Takes a free slot.
    ///
    /// # Panics
    ///
    /// Panics when all [`MATRIX_POOL_CAPACITY`] slots are live.
    pub fn allocate(&mut self) -> MatrixIndex {
        let Some(index) = self.free.pop() else {
            panic!("MatrixPool exhausted: all {} matrices are in use", MATRIX_POOL_CAPACITY);
        };

        self.live[index.get()] = true;
        trace!("Allocated matrix slot {}", index.get());
        index
    }

    /// Returns `index` to the pool and resets its matrix to identity.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not currently allocated.
    pub fn deallocate(&mut self, index: MatrixIndex) {
        let slot = index.get();
        assert!(
            self.live[slot],
            "MatrixPool slot {} deallocated while not allocated",
            slot
        );

        self.live[slot] = false;
        self.matrices[slot] = Mat4::IDENTITY;
        self.free.push(index);
        trace!("Released matrix slot {}", slot);
    }

    pub fn at(&self, index: MatrixIndex) -> &Mat4 {
        &self.matrices[index.get()]
    }

    pub fn at_mut(&mut self, index: MatrixIndex) -> &mut Mat4 {
        &mut self.matrices[index.get()]
    }

    pub fn is_live(&self, index: MatrixIndex) -> bool {
        self.live[index.get()]
    }

    pub fn live_count(&self) -> usize {
        MATRIX_POOL_CAPACITY - self.free.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}

impl Default for MatrixPool {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
