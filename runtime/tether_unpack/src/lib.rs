//! Tether unpacking - typed element extraction from container objects.
//!
//! Versioning and serialization harnesses need "every `T` inside this
//! object". The unpacker answers that for exactly five property shapes
//! (see [`Shape`]) and nothing deeper. Unsupported shapes, the
//! `custom_data`/`fragments` bags and values of unexpected structure are
//! skipped without errors or diagnostics.

mod shape;
mod unpacker;

pub use shape::Shape;
pub use unpacker::{ShapePlan, Unpacker};
