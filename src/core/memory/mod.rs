//=========================================================================
// Memory
//=========================================================================
//
// Fixed-address storage for data that components reference by index.
//
//=========================================================================

mod matrix_pool;

pub use matrix_pool::{MatrixIndex, MatrixPool, MATRIX_POOL_CAPACITY};
