#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use super::*;
use pretty_assertions::assert_eq;
use tether_ir::TypeExpr;

struct Model {
    types: SharedRegistry<TypeRegistry>,
    point: TypeId,
    point3: TypeId,
    bag: TypeId,
}

fn model() -> Model {
    let mut types = TypeRegistry::new();
    let point = types
        .register_class(
            "geo.Point",
            None,
            &[],
            vec![("X", TypeExpr::named(TypeId::FLOAT))],
        )
        .unwrap();
    let point3 = types
        .register_class(
            "geo.Point3",
            Some(point),
            &[],
            vec![("Z", TypeExpr::named(TypeId::FLOAT))],
        )
        .unwrap();
    let p = || TypeExpr::named(point);
    let bag = types
        .register_class(
            "geo.Bag",
            None,
            &[],
            vec![
                ("Label", TypeExpr::named(TypeId::STR)),
                ("Anchor", p()),
                ("Path", TypeExpr::list(p())),
                ("Grid", TypeExpr::list(TypeExpr::list(p()))),
                ("Named", TypeExpr::string_map(p())),
                ("Groups", TypeExpr::string_map(TypeExpr::set(p()))),
                ("Deep", TypeExpr::list(TypeExpr::list(TypeExpr::list(p())))),
                ("Records", TypeExpr::list(TypeExpr::string_map(p()))),
            ],
        )
        .unwrap();
    Model {
        types: SharedRegistry::new(types),
        point,
        point3,
        bag,
    }
}

impl Model {
    fn point(&self, x: f64) -> Value {
        ObjectValue::builder(&self.types, self.point)
            .unwrap()
            .set("X", x)
            .unwrap()
            .into_value()
    }

    fn points(&self, n: usize) -> Value {
        Value::list((0..n).map(|i| self.point(i as f64)).collect())
    }

    fn xs(&self, found: &[Value]) -> Vec<f64> {
        found
            .iter()
            .map(|v| {
                v.as_object()
                    .and_then(|o| o.get(&self.types, "X"))
                    .and_then(Value::as_float)
                    .unwrap()
            })
            .collect()
    }
}

#[test]
fn test_plan_lists_supported_fields_only() {
    let m = model();
    let unpacker = Unpacker::new(m.types.clone());
    let plan = unpacker.plan(m.bag, m.point);
    assert_eq!(
        plan.entries(),
        &[
            (1, Shape::Single),
            (2, Shape::Sequence),
            (3, Shape::NestedSequence),
            (4, Shape::Mapping),
            (5, Shape::MappingOfSequence),
        ]
    );
    assert!(unpacker.plan(m.bag, m.point3).is_empty());
}

#[test]
fn test_plans_are_cached() {
    let m = model();
    let unpacker = Unpacker::new(m.types.clone());
    let first = unpacker.plan(m.bag, m.point);
    let second = unpacker.plan(m.bag, m.point);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(unpacker.cached_plans(), 1);

    unpacker.plan(m.bag, TypeId::STR);
    assert_eq!(unpacker.cached_plans(), 2);
}

#[test]
fn test_unpack_walks_each_shape() {
    let m = model();
    let unpacker = Unpacker::new(m.types.clone());
    let bag = ObjectValue::builder(&m.types, m.bag)
        .unwrap()
        .set("Anchor", m.point(100.0))
        .unwrap()
        .set("Path", Value::list(vec![m.point(1.0), m.point(2.0)]))
        .unwrap()
        .set("Grid", Value::list(vec![Value::list(vec![m.point(3.0)])]))
        .unwrap()
        .set("Named", Value::map_from([("a", m.point(4.0))]))
        .unwrap()
        .set(
            "Groups",
            Value::map_from([("g", Value::list(vec![m.point(5.0), m.point(6.0)]))]),
        )
        .unwrap()
        .finish();

    let found = unpacker.unpack(&bag, m.point);
    assert_eq!(m.xs(&found), vec![100.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn test_unsupported_shapes_and_bags_are_ignored() {
    let m = model();
    let unpacker = Unpacker::new(m.types.clone());
    let deep = Value::list(vec![Value::list(vec![m.points(3)])]);
    let records = Value::list(vec![Value::map_from([("a", m.point(1.0))])]);
    let bag = ObjectValue::builder(&m.types, m.bag)
        .unwrap()
        .set("Deep", deep)
        .unwrap()
        .set("Records", records)
        .unwrap()
        .custom("extra", m.point(9.0))
        .custom("many", m.points(3))
        .fragment(m.point(8.0))
        .finish();

    assert!(unpacker.unpack(&bag, m.point).is_empty());
}

#[test]
fn test_nulls_and_mismatched_values_are_skipped() {
    let m = model();
    let unpacker = Unpacker::new(m.types.clone());
    let bag = ObjectValue::builder(&m.types, m.bag)
        .unwrap()
        .set("Anchor", Value::string("not a point"))
        .unwrap()
        .set(
            "Path",
            Value::list(vec![Value::Null, m.point(1.0), Value::Int(3)]),
        )
        .unwrap()
        // Declared as a nested sequence but holding points directly.
        .set("Grid", m.points(2))
        .unwrap()
        .set("Named", Value::list(vec![m.point(2.0)]))
        .unwrap()
        .finish();

    assert_eq!(m.xs(&unpacker.unpack(&bag, m.point)), vec![1.0]);
}

#[test]
fn test_subtype_instances_are_returned() {
    let m = model();
    let unpacker = Unpacker::new(m.types.clone());
    let p3 = ObjectValue::builder(&m.types, m.point3)
        .unwrap()
        .set("X", 7.0)
        .unwrap()
        .into_value();
    let bag = ObjectValue::builder(&m.types, m.bag)
        .unwrap()
        .set("Anchor", p3)
        .unwrap()
        .finish();

    let found = unpacker.unpack(&bag, m.point);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].runtime_type(), Some(m.point3));
}

#[test]
fn test_found_elements_are_not_searched() {
    let m = model();
    let unpacker = Unpacker::new(m.types.clone());
    let inner = ObjectValue::builder(&m.types, m.bag)
        .unwrap()
        .set("Path", m.points(3))
        .unwrap()
        .into_value();
    let outer = ObjectValue::builder(&m.types, m.bag)
        .unwrap()
        .set("Path", Value::list(vec![inner]))
        .unwrap()
        .finish();

    // `Path` holds a bag, not points; nothing inside it is visited.
    assert!(unpacker.unpack(&outer, m.point).is_empty());
}

#[test]
fn test_unpack_value_on_non_objects() {
    let m = model();
    let unpacker = Unpacker::new(m.types.clone());
    assert!(unpacker.unpack_value(&m.points(3), m.point).is_empty());
    assert!(unpacker.unpack_value(&Value::Null, m.point).is_empty());

    let bag = ObjectValue::builder(&m.types, m.bag)
        .unwrap()
        .set("Path", m.points(3))
        .unwrap()
        .into_value();
    assert_eq!(unpacker.unpack_value(&bag, m.point).len(), 3);
}

#[test]
fn test_primitive_targets() {
    let m = model();
    let unpacker = Unpacker::new(m.types.clone());
    let bag = ObjectValue::builder(&m.types, m.bag)
        .unwrap()
        .set("Label", "bag")
        .unwrap()
        .finish();
    assert_eq!(
        unpacker.unpack(&bag, TypeId::STR),
        vec![Value::string("bag")]
    );
}
