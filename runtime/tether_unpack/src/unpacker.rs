//! Extraction of target-typed elements from container objects.
//!
//! For a (container type, target type) pair the unpacker classifies every
//! declared property once and caches the resulting `ShapePlan`. Unpacking
//! an instance then only touches the planned fields.

use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use tether_ir::{SharedRegistry, TypeId, TypeRegistry};
use tether_value::{ObjectValue, Value};

use crate::Shape;

/// Which fields of a container type hold target elements, and how.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShapePlan {
    entries: Vec<(usize, Shape)>,
}

impl ShapePlan {
    fn build(types: &TypeRegistry, container: TypeId, target: TypeId) -> Self {
        let entries = types
            .properties(container)
            .iter()
            .enumerate()
            .filter_map(|(index, prop)| Shape::classify(&prop.ty, target).map(|s| (index, s)))
            .collect();
        ShapePlan { entries }
    }

    /// `(field index, shape)` pairs in declaration order.
    pub fn entries(&self) -> &[(usize, Shape)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pulls every instance of a target type out of a container object.
///
/// Never records diagnostics and never fails: properties of unsupported
/// shape and values of unexpected structure are skipped.
pub struct Unpacker {
    types: SharedRegistry<TypeRegistry>,
    plans: DashMap<(TypeId, TypeId), Arc<ShapePlan>, FxBuildHasher>,
}

impl Unpacker {
    pub fn new(types: SharedRegistry<TypeRegistry>) -> Self {
        Unpacker {
            types,
            plans: DashMap::with_hasher(FxBuildHasher),
        }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// The cached plan for `container` and `target`, built on first use.
    pub fn plan(&self, container: TypeId, target: TypeId) -> Arc<ShapePlan> {
        let key = (container, target);
        if let Some(hit) = self.plans.get(&key) {
            return Arc::clone(hit.value());
        }

        let built = Arc::new(ShapePlan::build(&self.types, container, target));
        tracing::trace!(
            container = self.types.full_name(container),
            target = self.types.full_name(target),
            fields = built.len(),
            "built shape plan"
        );
        Arc::clone(self.plans.entry(key).or_insert(built).value())
    }

    /// Every instance of `target` held by `container`'s declared properties.
    ///
    /// Elements are grouped by property in declaration order. `Null`s,
    /// elements whose runtime type is not assignable to `target`, and the
    /// `custom_data`/`fragments` bags are skipped. Found elements are not
    /// searched further.
    pub fn unpack(&self, container: &ObjectValue, target: TypeId) -> Vec<Value> {
        let plan = self.plan(container.type_id(), target);
        let mut found = Vec::new();
        for &(index, shape) in plan.entries() {
            let Some(field) = container.field(index) else {
                continue;
            };
            shape.for_each_element(field, |elem| {
                if self.is_target(elem, target) {
                    found.push(elem.clone());
                }
            });
        }
        found
    }

    /// [`unpack`](Self::unpack) for a `Value`; non-objects hold nothing.
    pub fn unpack_value(&self, container: &Value, target: TypeId) -> Vec<Value> {
        container
            .as_object()
            .map(|object| self.unpack(object, target))
            .unwrap_or_default()
    }

    /// Number of cached plans.
    pub fn cached_plans(&self) -> usize {
        self.plans.len()
    }

    fn is_target(&self, value: &Value, target: TypeId) -> bool {
        value
            .runtime_type()
            .is_some_and(|ty| self.types.is_instance_of(ty, target))
    }
}

impl std::fmt::Debug for Unpacker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unpacker")
            .field("cached_plans", &self.plans.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
