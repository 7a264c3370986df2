//! Runtime values for the extension runtime.
//!
//! Domain objects are flat data records ([`ObjectValue`]) whose layout comes
//! from the `TypeRegistry`. Behaviour is never attached to them directly; it
//! lives in extension functions resolved by `tether_dispatch`.

mod object;
mod value;

pub use object::{ObjectBuilder, ObjectError, ObjectValue};
pub use value::Value;
