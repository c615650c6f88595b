//! Layout calculation modules for N-up composition
//!
//! This module handles all the geometric calculations:
//! - Grid selection (fixed or chosen from the candidate list)
//! - Cell bounds on the output page
//! - Content placement (uniform scale, centered)

mod grid;
mod placement;
mod types;

pub use grid::*;
pub use placement::*;
pub use types::*;
