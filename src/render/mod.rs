//=========================================================================
// Render Data
//=========================================================================
//
// CPU side of the pseudo-3D sprite pipeline. No GPU backend lives here;
// the output is a depth-sorted DrawList a renderer can consume as is.
//
//   Transform2D + Sprite3D ─► Sprite3DSystem ─► MatrixPool slot
//                                             └► DrawList (back-to-front)
//
//=========================================================================

//=== Module Declarations =================================================

mod draw_list;
mod sprite3d;

//=== Public API ==========================================================

pub use draw_list::{DrawCall, DrawList};
pub use sprite3d::{release_destroyed_sprites, Sprite3D, Sprite3DSystem};
