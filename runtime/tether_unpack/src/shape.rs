//! The five property shapes the unpacker understands.

use tether_ir::{TypeExpr, TypeId};
use tether_value::Value;

/// How a target element type `T` is embedded in a declared property type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// `T`
    Single,
    /// `List<T>` or `Set<T>`
    Sequence,
    /// A sequence of sequences of `T`, exactly two levels.
    NestedSequence,
    /// `Map<String, T>`; keys are discarded.
    Mapping,
    /// `Map<String, List<T>>` (or `Set<T>`), flattened.
    MappingOfSequence,
}

impl Shape {
    /// Match `declared` against the five shapes around `target`.
    ///
    /// Returns `None` for anything else: deeper nesting, sequences of
    /// mappings, mappings of mappings, non-string keys, or a different
    /// element type.
    pub fn classify(declared: &TypeExpr, target: TypeId) -> Option<Shape> {
        let is_target = |expr: &TypeExpr| *expr == TypeExpr::Named(target);

        if is_target(declared) {
            return Some(Shape::Single);
        }
        if let Some(elem) = declared.sequence_element() {
            if is_target(elem) {
                return Some(Shape::Sequence);
            }
            return elem
                .sequence_element()
                .filter(|&inner| is_target(inner))
                .map(|_| Shape::NestedSequence);
        }
        if let Some(value) = declared.string_map_value() {
            if is_target(value) {
                return Some(Shape::Mapping);
            }
            return value
                .sequence_element()
                .filter(|&inner| is_target(inner))
                .map(|_| Shape::MappingOfSequence);
        }
        None
    }

    /// Feed every element of `value` that sits at this shape's element
    /// position to `visit`.
    ///
    /// Layers whose runtime structure does not match the shape are skipped
    /// silently. Elements are passed as found; filtering them is up to the
    /// caller.
    pub(crate) fn for_each_element<'v>(self, value: &'v Value, mut visit: impl FnMut(&'v Value)) {
        match self {
            Shape::Single => visit(value),
            Shape::Sequence => value.as_list().into_iter().flatten().for_each(visit),
            Shape::NestedSequence => value
                .as_list()
                .into_iter()
                .flatten()
                .filter_map(Value::as_list)
                .flatten()
                .for_each(visit),
            Shape::Mapping => value
                .as_map()
                .into_iter()
                .flat_map(|map| map.values())
                .for_each(visit),
            Shape::MappingOfSequence => value
                .as_map()
                .into_iter()
                .flat_map(|map| map.values())
                .filter_map(Value::as_list)
                .flatten()
                .for_each(visit),
        }
    }
}
