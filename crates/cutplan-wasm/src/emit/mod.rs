//! Text-to-text program transforms.
//!
//! Both transforms work on raw lines rather than the parsed model, so every
//! line they do not touch is reproduced byte-for-byte.

mod append;
mod layout;
mod reorder;

pub use append::{append_skeleton, append_skeleton_with_config};
pub use reorder::reorder;
