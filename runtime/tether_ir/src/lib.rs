//! Tether IR - names, type identities and type metadata.
//!
//! Everything the extension runtime knows about the object model flows
//! through this crate:
//!
//! - `Name` / `StringInterner`: interned identifiers for function, property
//!   and type names
//! - `TypeId`: compact type identity with pre-registered well-known types
//! - `TypeRegistry`: the type-descriptor capability (hierarchy, declared
//!   properties, assignability)
//! - `TypeExpr`: the declared type of a property, including sequence and
//!   mapping wrappers
//! - `SharedRegistry`: `Arc` wrapper used to share frozen registries

mod interner;
mod name;
mod registry;
mod shared;
mod type_expr;
mod type_id;

pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use registry::{
    Conversion, PropertyDef, RegistryError, TypeEntry, TypeKind, TypeRegistry, CUSTOM_DATA,
    FRAGMENTS,
};
pub use shared::SharedRegistry;
pub use type_expr::TypeExpr;
pub use type_id::TypeId;
