//! Compact type identity.
//!
//! Well-known types have fixed indices (0-6) and are registered by every
//! `TypeRegistry`; domain types are numbered from `FIRST_USER` in
//! registration order.

use std::fmt;

/// Type identifier, an index into a `TypeRegistry`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// The universal top type: every value is assignable to it.
    pub const OBJECT: TypeId = TypeId(0);
    pub const BOOL: TypeId = TypeId(1);
    pub const INT: TypeId = TypeId(2);
    pub const FLOAT: TypeId = TypeId(3);
    pub const STR: TypeId = TypeId(4);
    /// Runtime type of any list value, regardless of element type.
    pub const LIST: TypeId = TypeId(5);
    /// Runtime type of any string-keyed map value.
    pub const MAP: TypeId = TypeId(6);

    /// First index handed out to registered domain types.
    pub const FIRST_USER: u32 = 7;

    /// Well-known types with their full names, in index order.
    pub(crate) const WELL_KNOWN: [(TypeId, &'static str); 7] = [
        (Self::OBJECT, "std.Object"),
        (Self::BOOL, "std.Bool"),
        (Self::INT, "std.Int"),
        (Self::FLOAT, "std.Float"),
        (Self::STR, "std.String"),
        (Self::LIST, "std.List"),
        (Self::MAP, "std.Map"),
    ];

    #[inline]
    pub const fn new(index: u32) -> Self {
        TypeId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Value-like types that plain `Null` cannot stand in for.
    #[inline]
    pub const fn is_primitive(self) -> bool {
        matches!(self.0, 1..=4)
    }

    #[inline]
    pub const fn is_well_known(self) -> bool {
        self.0 < Self::FIRST_USER
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::OBJECT => write!(f, "TypeId::OBJECT"),
            Self::BOOL => write!(f, "TypeId::BOOL"),
            Self::INT => write!(f, "TypeId::INT"),
            Self::FLOAT => write!(f, "TypeId::FLOAT"),
            Self::STR => write!(f, "TypeId::STR"),
            Self::LIST => write!(f, "TypeId::LIST"),
            Self::MAP => write!(f, "TypeId::MAP"),
            _ => write!(f, "TypeId({})", self.0),
        }
    }
}
