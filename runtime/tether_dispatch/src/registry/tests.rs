#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use super::*;
use pretty_assertions::assert_eq;
use tether_diagnostic::DiagnosticConfig;

fn types() -> (SharedRegistry<TypeRegistry>, TypeId, TypeId) {
    let mut types = TypeRegistry::new();
    let point = types.register_class("geo.Point", None, &[], vec![]).unwrap();
    let line = types.register_class("geo.Line", None, &[], vec![]).unwrap();
    (SharedRegistry::new(types), point, line)
}

fn returns(value: f64) -> impl Fn(&Invocation<'_>) -> ExtensionResult + Send + Sync + 'static {
    move |_| Ok(Value::Float(value))
}

#[test]
fn test_register_and_lookup_by_receiver() {
    let (types, point, line) = types();
    let mut registry = ExtensionRegistry::new(types.clone());

    let k1 = registry
        .register("geo.Query", "Length", &[line], TypeId::FLOAT, returns(1.0))
        .unwrap();
    let k2 = registry
        .register("geo.Query", "Length", &[line, TypeId::FLOAT], TypeId::FLOAT, returns(2.0))
        .unwrap();
    registry
        .register("geo.Query", "Length", &[point], TypeId::FLOAT, returns(3.0))
        .unwrap();

    let length = types.intern("Length");
    let on_line: Vec<&VersionKey> = registry
        .by_receiver(line, length)
        .iter()
        .map(|c| c.key())
        .collect();
    assert_eq!(on_line, vec![&k1, &k2]);
    assert_eq!(registry.by_receiver(point, length).len(), 1);
    assert!(registry.by_receiver(line, types.intern("Area")).is_empty());
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_declaration_order_is_monotonic() {
    let (types, point, line) = types();
    let mut registry = ExtensionRegistry::new(types);
    registry
        .register("geo.Query", "A", &[point], TypeId::FLOAT, returns(0.0))
        .unwrap();
    registry
        .register("geo.Query", "B", &[line], TypeId::FLOAT, returns(0.0))
        .unwrap();
    let orders: Vec<u32> = registry.iter().map(|c| c.order()).collect();
    assert_eq!(orders, vec![0, 1]);
}

#[test]
fn test_registration_errors() {
    let (types, point, _) = types();
    let mut registry = ExtensionRegistry::new(types);

    assert_eq!(
        registry
            .register("geo.Query", "Length", &[], TypeId::FLOAT, returns(0.0))
            .unwrap_err(),
        RegistrationError::MissingReceiver("Length".into())
    );
    assert_eq!(
        registry
            .register("geo.Query", "", &[point], TypeId::FLOAT, returns(0.0))
            .unwrap_err(),
        RegistrationError::EmptyName
    );
    let bogus = TypeId::new(900);
    assert_eq!(
        registry
            .register("geo.Query", "Length", &[point, bogus], TypeId::FLOAT, returns(0.0))
            .unwrap_err(),
        RegistrationError::UnknownType(bogus)
    );

    let key = registry
        .register("geo.Query", "Length", &[point], TypeId::FLOAT, returns(0.0))
        .unwrap();
    // A return-type change alone is the same key.
    assert_eq!(
        registry
            .register("geo.Query", "Length", &[point], TypeId::INT, returns(0.0))
            .unwrap_err(),
        RegistrationError::DuplicateKey(key)
    );
}

#[test]
fn test_invoke_passes_receiver_and_args() {
    let (types, point, _) = types();
    let mut registry = ExtensionRegistry::new(types);
    let key = registry
        .register("geo.Modify", "Scale", &[point, TypeId::FLOAT], point, |inv| {
            let factor = inv.arg(0).and_then(Value::as_float).unwrap_or(1.0);
            assert_eq!(inv.args().len(), 1);
            assert!(inv.receiver().as_object().is_none());
            Ok(Value::Float(factor * 2.0))
        })
        .unwrap();

    let sink = DiagnosticSink::new(DiagnosticConfig::quiet());
    let candidate = registry.by_key(&key).unwrap();
    let result = candidate
        .invoke(&[Value::Null, Value::Float(4.0)], &sink)
        .unwrap();
    assert_eq!(result, Value::Float(8.0));
}

#[test]
fn test_invocation_reports_with_own_key() {
    let (types, point, _) = types();
    let mut registry = ExtensionRegistry::new(types);
    let key = registry
        .register("geo.Query", "Centroid", &[point], point, |inv| {
            inv.report("degenerate input");
            Ok(Value::Null)
        })
        .unwrap();

    let sink = DiagnosticSink::new(DiagnosticConfig::quiet());
    registry.by_key(&key).unwrap().invoke(&[Value::Null], &sink).unwrap();

    let records = sink.snapshot();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].code, ErrorCode::E3001);
    assert_eq!(
        records[0].message,
        "geo.Query::Centroid(geo.Point): degenerate input"
    );
}

#[test]
fn test_resolve_key_follows_upgrades() {
    let (types, point, _) = types();
    let mut registry = ExtensionRegistry::new(types);
    let current = registry
        .register("geo.Query", "Area", &[point], TypeId::FLOAT, returns(0.0))
        .unwrap();

    let v1 = VersionKey::from_parts("geo.Query", "Area", ["geo.OldPoint"]);
    let v2 = VersionKey::from_parts("geo.Query", "SurfaceArea", ["geo.Point"]);
    registry.record_upgrade(v1.clone(), v2.clone());
    registry.record_upgrade(v2.clone(), current.clone());

    assert_eq!(registry.resolve_key(&current).unwrap().key(), &current);
    assert_eq!(registry.resolve_key(&v1).unwrap().key(), &current);
    assert_eq!(registry.resolve_key(&v2).unwrap().key(), &current);
}

#[test]
fn test_resolve_key_errors() {
    let (types, _, _) = types();
    let mut registry = ExtensionRegistry::new(types);

    let missing = VersionKey::from_stored("geo.Query::Gone(geo.Point)");
    let err = registry.resolve_key(&missing).unwrap_err();
    assert_eq!(err, KeyLookupError::Unknown(missing));
    assert_eq!(err.code(), ErrorCode::E2001);

    let a = VersionKey::from_stored("a::f(x)");
    let b = VersionKey::from_stored("b::f(x)");
    registry.record_upgrade(a.clone(), b.clone());
    registry.record_upgrade(b, a.clone());
    let err = registry.resolve_key(&a).unwrap_err();
    assert_eq!(err, KeyLookupError::UpgradeCycle(a));
    assert_eq!(err.code(), ErrorCode::E2002);
}
