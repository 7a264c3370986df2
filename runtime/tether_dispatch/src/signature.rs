//! Function signatures.

use tether_ir::{Name, TypeId};

/// The observable shape of one extension overload.
///
/// `params[0]` is the receiver type. Signatures are immutable once
/// registered.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionSignature {
    /// Full name of the module that declares the function, e.g.
    /// `geo.Query`.
    pub declaring_type: Name,
    pub name: Name,
    pub params: Vec<TypeId>,
    /// Not part of the version key.
    pub returns: TypeId,
}

impl FunctionSignature {
    pub fn new(declaring_type: Name, name: Name, params: Vec<TypeId>, returns: TypeId) -> Self {
        FunctionSignature {
            declaring_type,
            name,
            params,
            returns,
        }
    }

    pub fn receiver(&self) -> Option<TypeId> {
        self.params.first().copied()
    }

    /// Number of parameters, receiver included.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}
