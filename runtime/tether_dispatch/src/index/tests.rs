#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use super::*;
use pretty_assertions::assert_eq;
use tether_value::Value;

use crate::{ExtensionResult, Invocation, VersionKey};

#[derive(Clone, Copy)]
struct Geo {
    geometry: TypeId,
    curve: TypeId,
    line: TypeId,
    arc_line: TypeId,
    point: TypeId,
}

fn unit(_: &Invocation<'_>) -> ExtensionResult {
    Ok(Value::Null)
}

/// `ArcLine : Line : ICurve : IGeometry`, plus `Point : IGeometry`.
fn fixture(register: impl FnOnce(&mut ExtensionRegistry, Geo)) -> (SignatureIndex, Geo) {
    let mut types = TypeRegistry::new();
    let geometry = types.register_interface("geo.IGeometry", &[]).unwrap();
    let curve = types.register_interface("geo.ICurve", &[geometry]).unwrap();
    let point = types.register_class("geo.Point", None, &[geometry], vec![]).unwrap();
    let line = types.register_class("geo.Line", None, &[curve], vec![]).unwrap();
    let arc_line = types.register_class("geo.ArcLine", Some(line), &[], vec![]).unwrap();
    let geo = Geo {
        geometry,
        curve,
        line,
        arc_line,
        point,
    };

    let mut registry = ExtensionRegistry::new(SharedRegistry::new(types));
    register(&mut registry, geo);
    (SignatureIndex::new(SharedRegistry::new(registry)), geo)
}

fn keys(set: &CandidateSet) -> Vec<String> {
    set.iter().map(|c| c.key().to_string()).collect()
}

#[test]
fn test_candidates_cover_hierarchy_in_declaration_order() {
    let (index, f) = fixture(|r, f| {
        r.register("geo.Query", "Length", &[f.curve], TypeId::FLOAT, unit).unwrap();
        r.register("geo.Query", "Length", &[f.arc_line], TypeId::FLOAT, unit).unwrap();
        r.register("geo.Query", "Length", &[TypeId::OBJECT], TypeId::FLOAT, unit).unwrap();
        r.register("geo.Query", "Length", &[f.line, TypeId::FLOAT], TypeId::FLOAT, unit).unwrap();
        r.register("geo.Query", "Length", &[f.point], TypeId::FLOAT, unit).unwrap();
        r.register("geo.Query", "Area", &[f.geometry], TypeId::FLOAT, unit).unwrap();
    });
    let length = index.types().intern("Length");

    assert_eq!(
        keys(&index.candidates_for(f.arc_line, length)),
        vec![
            "geo.Query::Length(geo.ICurve)",
            "geo.Query::Length(geo.ArcLine)",
            "geo.Query::Length(std.Object)",
            "geo.Query::Length(geo.Line,std.Float)",
        ]
    );
    assert_eq!(
        keys(&index.candidates_for(f.point, length)),
        vec!["geo.Query::Length(std.Object)", "geo.Query::Length(geo.Point)"]
    );
}

#[test]
fn test_with_arity_filters() {
    let (index, f) = fixture(|r, f| {
        r.register("geo.Query", "Length", &[f.line], TypeId::FLOAT, unit).unwrap();
        r.register("geo.Query", "Length", &[f.line, TypeId::FLOAT], TypeId::FLOAT, unit).unwrap();
    });
    let set = index.candidates_named(f.line, "Length");
    assert_eq!(set.with_arity(1).count(), 1);
    assert_eq!(set.with_arity(2).count(), 1);
    assert_eq!(set.with_arity(3).count(), 0);
}

#[test]
fn test_duplicate_parameter_lists_keep_first() {
    let (index, f) = fixture(|r, f| {
        r.register("geo.Query", "Length", &[f.line], TypeId::FLOAT, unit).unwrap();
        r.register("geo.Legacy", "Length", &[f.line], TypeId::FLOAT, unit).unwrap();
    });
    let set = index.candidates_named(f.line, "Length");
    assert_eq!(keys(&set), vec!["geo.Query::Length(geo.Line)"]);
}

#[test]
fn test_missing_function_is_empty_not_error() {
    let (index, f) = fixture(|_, _| {});
    assert!(index.candidates_named(f.line, "Length").is_empty());
    // Never-interned names are not cached or interned.
    assert_eq!(index.cached_len(), 0);
    assert_eq!(index.types().interner().get("Length"), None);

    let area = index.types().intern("Area");
    assert!(index.candidates_for(f.line, area).is_empty());
    assert!(index.is_cached(f.line, area));
}

#[test]
fn test_cache_hits_return_same_set() {
    let (index, f) = fixture(|r, f| {
        r.register("geo.Query", "Length", &[f.curve], TypeId::FLOAT, unit).unwrap();
    });
    let length = index.types().intern("Length");

    let first = index.candidates_for(f.line, length);
    let second = index.candidates_for(f.line, length);
    assert!(first.ptr_eq(&second));
    assert_eq!(index.cached_len(), 1);

    // Keyed by requested receiver type, not by where overloads live.
    let other = index.candidates_for(f.arc_line, length);
    assert!(!first.ptr_eq(&other));
    assert_eq!(first, other);
    assert_eq!(index.cached_len(), 2);
}

#[test]
fn test_concurrent_first_lookups_agree() {
    let (index, f) = fixture(|r, f| {
        for i in 0..16 {
            r.register("geo.Query", &format!("Q{i}"), &[f.curve], TypeId::FLOAT, unit)
                .unwrap();
            r.register("geo.Query", &format!("Q{i}"), &[f.line], TypeId::FLOAT, unit)
                .unwrap();
        }
    });
    let index = &index;
    let line = f.line;

    let results: Vec<Vec<Vec<VersionKey>>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(move || {
                    (0..16)
                        .map(|i| {
                            index
                                .candidates_named(line, &format!("Q{i}"))
                                .iter()
                                .map(|c| c.key().clone())
                                .collect::<Vec<_>>()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for result in &results[1..] {
        assert_eq!(result, &results[0]);
    }
    assert_eq!(results[0][0].len(), 2);
    assert_eq!(index.cached_len(), 16);
}
