//! Planar types: projected coordinates, pixel rectangles and sizes.

mod point;
mod rect;
mod size;

pub use point::ProjectedCoord;
pub use rect::Rect;
pub use size::Size;

pub use crate::area::ProjectedArea;
