//! HK MPF dialect: program model, arc tessellation, and the line parser.

pub mod arc;
pub mod parser;
pub mod placement;
pub mod types;

pub use arc::*;
pub use parser::{parse, parse_bytes, parse_with_config};
pub use placement::*;
pub use types::*;
