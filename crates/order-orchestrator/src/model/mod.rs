//! Pure data structures read from the order query surface.

pub mod order;
pub mod product;

pub use order::*;
pub use product::*;
