//! Domain objects.
//!
//! Every domain object is a flat record laid out by its class's flattened
//! property list, plus two ancillary bags: free-form `custom_data` and a
//! list of attached `fragments`. The bags are part of the object's identity
//! but are not declared properties.

use std::collections::BTreeMap;

use tether_ir::{PropertyDef, TypeId, TypeKind, TypeRegistry};

use crate::Value;

/// Errors raised while constructing objects.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ObjectError {
    #[error("`{type_name}` is not a class and cannot be instantiated")]
    NotAClass { type_name: String },
    #[error("`{type_name}` has no property `{property}`")]
    UnknownProperty { type_name: String, property: String },
}

/// Instance of a registered class.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectValue {
    type_id: TypeId,
    /// Field values in `TypeRegistry::properties` order.
    fields: Vec<Value>,
    custom_data: BTreeMap<String, Value>,
    fragments: Vec<Value>,
}

impl ObjectValue {
    /// Start building an instance of `type_id`.
    pub fn builder(types: &TypeRegistry, type_id: TypeId) -> Result<ObjectBuilder<'_>, ObjectError> {
        match types.entry(type_id) {
            Some(entry) if entry.kind == TypeKind::Class => Ok(ObjectBuilder {
                types,
                object: ObjectValue {
                    type_id,
                    fields: vec![Value::Null; entry.properties.len()],
                    custom_data: BTreeMap::new(),
                    fragments: Vec::new(),
                },
            }),
            _ => Err(ObjectError::NotAClass {
                type_name: types.full_name(type_id).to_owned(),
            }),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }

    /// Field value by property name.
    pub fn get(&self, types: &TypeRegistry, property: &str) -> Option<&Value> {
        let name = types.interner().get(property)?;
        let index = types.property_index(self.type_id, name)?;
        self.fields.get(index)
    }

    /// Declared properties paired with their values.
    pub fn properties<'a>(
        &'a self,
        types: &'a TypeRegistry,
    ) -> impl Iterator<Item = (&'a PropertyDef, &'a Value)> + 'a {
        types.properties(self.type_id).iter().zip(self.fields.iter())
    }

    /// The free-form key/value ancillary bag.
    pub fn custom_data(&self) -> &BTreeMap<String, Value> {
        &self.custom_data
    }

    /// The attached-fragment ancillary bag.
    pub fn fragments(&self) -> &[Value] {
        &self.fragments
    }
}

/// Builder for [`ObjectValue`]. Unset properties stay `Null`.
///
/// Property values are not checked against their declared types; readers
/// such as the unpacker skip values whose runtime shape does not match.
pub struct ObjectBuilder<'a> {
    types: &'a TypeRegistry,
    object: ObjectValue,
}

impl ObjectBuilder<'_> {
    /// Set a declared property.
    pub fn set(mut self, property: &str, value: impl Into<Value>) -> Result<Self, ObjectError> {
        let type_id = self.object.type_id;
        let index = self
            .types
            .interner()
            .get(property)
            .and_then(|name| self.types.property_index(type_id, name))
            .ok_or_else(|| ObjectError::UnknownProperty {
                type_name: self.types.full_name(type_id).to_owned(),
                property: property.to_owned(),
            })?;
        self.object.fields[index] = value.into();
        Ok(self)
    }

    /// Add an entry to the custom-data bag.
    #[must_use]
    pub fn custom(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.object.custom_data.insert(key.into(), value.into());
        self
    }

    /// Attach a fragment.
    #[must_use]
    pub fn fragment(mut self, value: impl Into<Value>) -> Self {
        self.object.fragments.push(value.into());
        self
    }

    pub fn finish(self) -> ObjectValue {
        self.object
    }

    pub fn into_value(self) -> Value {
        Value::object(self.object)
    }
}
