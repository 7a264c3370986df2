//! Declared property types.

use crate::TypeId;

/// The declared type of a property: a named type, possibly wrapped in
/// sequence and mapping layers.
///
/// `List` is an ordered sequence and `Set` an unordered one; at runtime
/// both hold `Value::List`. Mapping values are `Value::Map`, whose keys are
/// always strings, so a `Map` whose declared key is anything other than
/// `TypeId::STR` never matches a runtime value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Named(TypeId),
    List(Box<TypeExpr>),
    Set(Box<TypeExpr>),
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
}

impl TypeExpr {
    pub fn named(id: TypeId) -> Self {
        TypeExpr::Named(id)
    }

    pub fn list(elem: TypeExpr) -> Self {
        TypeExpr::List(Box::new(elem))
    }

    pub fn set(elem: TypeExpr) -> Self {
        TypeExpr::Set(Box::new(elem))
    }

    /// A string-keyed mapping.
    pub fn string_map(value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(TypeExpr::Named(TypeId::STR)),
            value: Box::new(value),
        }
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Element type of a `List` or `Set`.
    pub fn sequence_element(&self) -> Option<&TypeExpr> {
        match self {
            TypeExpr::List(elem) | TypeExpr::Set(elem) => Some(elem),
            _ => None,
        }
    }

    /// Value type of a mapping with `std.String` keys.
    pub fn string_map_value(&self) -> Option<&TypeExpr> {
        match self {
            TypeExpr::Map { key, value } if **key == TypeExpr::Named(TypeId::STR) => Some(value),
            _ => None,
        }
    }

    /// Every `TypeId` mentioned by this expression.
    pub fn mentioned_types(&self) -> Vec<TypeId> {
        let mut out = Vec::new();
        self.collect_types(&mut out);
        out
    }

    fn collect_types(&self, out: &mut Vec<TypeId>) {
        match self {
            TypeExpr::Named(id) => out.push(*id),
            TypeExpr::List(elem) | TypeExpr::Set(elem) => elem.collect_types(out),
            TypeExpr::Map { key, value } => {
                key.collect_types(out);
                value.collect_types(out);
            }
        }
    }
}
