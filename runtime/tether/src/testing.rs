//! Test support: a small geometry object model and container factory.
//!
//! Only built for unit tests and with the `testing` feature, which the
//! integration tests enable.
//!
//! ```text
//! geo.IGeometry
//!   geo.ICurve : IGeometry
//!   geo.Point : IGeometry          { X: Float, Y: Float }
//!   geo.Line : ICurve              { Start: Point, End: Point }
//!   geo.Polyline : ICurve          { Vertices: List<Point> }
//! ```

use tether_dispatch::{ExtensionError, ExtensionRegistry, RegistrationError, VersionKey};
use tether_ir::{RegistryError, SharedRegistry, TypeExpr, TypeId, TypeRegistry};
use tether_value::{ObjectError, ObjectValue, Value};

/// Ids of the geometry model types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geo {
    pub geometry: TypeId,
    pub curve: TypeId,
    pub point: TypeId,
    pub line: TypeId,
    pub polyline: TypeId,
}

/// Register the geometry model into `types`.
pub fn register_geo(types: &mut TypeRegistry) -> Result<Geo, RegistryError> {
    let float = || TypeExpr::named(TypeId::FLOAT);

    let geometry = types.register_interface("geo.IGeometry", &[])?;
    let curve = types.register_interface("geo.ICurve", &[geometry])?;
    let point = types.register_class(
        "geo.Point",
        None,
        &[geometry],
        vec![("X", float()), ("Y", float())],
    )?;
    let line = types.register_class(
        "geo.Line",
        None,
        &[curve],
        vec![
            ("Start", TypeExpr::named(point)),
            ("End", TypeExpr::named(point)),
        ],
    )?;
    let polyline = types.register_class(
        "geo.Polyline",
        None,
        &[curve],
        vec![("Vertices", TypeExpr::list(TypeExpr::named(point)))],
    )?;
    Ok(Geo {
        geometry,
        curve,
        point,
        line,
        polyline,
    })
}

impl Geo {
    pub fn point(&self, types: &TypeRegistry, x: f64, y: f64) -> Result<Value, ObjectError> {
        Ok(ObjectValue::builder(types, self.point)?
            .set("X", x)?
            .set("Y", y)?
            .into_value())
    }

    pub fn line(&self, types: &TypeRegistry, start: Value, end: Value) -> Result<Value, ObjectError> {
        Ok(ObjectValue::builder(types, self.line)?
            .set("Start", start)?
            .set("End", end)?
            .into_value())
    }

    pub fn polyline(&self, types: &TypeRegistry, vertices: Vec<Value>) -> Result<Value, ObjectError> {
        Ok(ObjectValue::builder(types, self.polyline)?
            .set("Vertices", Value::list(vertices))?
            .into_value())
    }

    /// Register `geo.Query::Length` overloads for lines and polylines, plus
    /// `geo.Query::Describe` on the universal type.
    pub fn register_extensions(
        &self,
        extensions: &mut ExtensionRegistry,
    ) -> Result<Vec<VersionKey>, RegistrationError> {
        Ok(vec![
            extensions.register("geo.Query", "Length", &[self.line], TypeId::FLOAT, |call| {
                let (start, end) = match call.receiver().as_object().map(ObjectValue::fields) {
                    Some([start, end]) => (start, end),
                    _ => return Err(ExtensionError::new("malformed line")),
                };
                distance(start, end).map(Value::Float)
            })?,
            extensions.register(
                "geo.Query",
                "Length",
                &[self.polyline],
                TypeId::FLOAT,
                |call| {
                    let vertices = call
                        .receiver()
                        .as_object()
                        .and_then(|o| o.fields().first())
                        .and_then(Value::as_list)
                        .unwrap_or_default();
                    let mut total = 0.0;
                    for pair in vertices.windows(2) {
                        match distance(&pair[0], &pair[1]) {
                            Ok(d) => total += d,
                            Err(err) => call.report(err),
                        }
                    }
                    Ok(Value::Float(total))
                },
            )?,
            extensions.register(
                "geo.Query",
                "Describe",
                &[TypeId::OBJECT],
                TypeId::STR,
                |call| Ok(Value::string(call.receiver().kind_name())),
            )?,
        ])
    }
}

fn coords(point: &Value) -> Result<(f64, f64), ExtensionError> {
    match point.as_object().map(ObjectValue::fields) {
        Some([x, y]) => match (x.as_float(), y.as_float()) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(ExtensionError::new("point has unset coordinates")),
        },
        _ => Err(ExtensionError::new("expected a point")),
    }
}

fn distance(a: &Value, b: &Value) -> Result<f64, ExtensionError> {
    let (ax, ay) = coords(a)?;
    let (bx, by) = coords(b)?;
    Ok((bx - ax).hypot(by - ay))
}

/// Optional extra property added by [`register_container`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerExtra {
    None,
    /// `Map<String, T>`
    Mapping,
    /// `Map<String, List<T>>`
    MappingOfSequence,
    /// `List<Map<String, T>>` (not traversed)
    SequenceOfMappings,
    /// `List<List<List<T>>>` (not traversed)
    TripleNesting,
}

/// Register a container class around `element`.
///
/// Every container declares `Single: T`, `Sequence: List<T>` and
/// `Nested: List<List<T>>`, plus the property selected by `extra`.
pub fn register_container(
    types: &mut TypeRegistry,
    name: &str,
    element: TypeId,
    extra: ContainerExtra,
) -> Result<TypeId, RegistryError> {
    let t = || TypeExpr::named(element);
    let mut properties = vec![
        ("Single", t()),
        ("Sequence", TypeExpr::list(t())),
        ("Nested", TypeExpr::list(TypeExpr::list(t()))),
    ];
    match extra {
        ContainerExtra::None => {}
        ContainerExtra::Mapping => properties.push(("Extra", TypeExpr::string_map(t()))),
        ContainerExtra::MappingOfSequence => {
            properties.push(("Extra", TypeExpr::string_map(TypeExpr::list(t()))));
        }
        ContainerExtra::SequenceOfMappings => {
            properties.push(("Extra", TypeExpr::list(TypeExpr::string_map(t()))));
        }
        ContainerExtra::TripleNesting => properties.push((
            "Extra",
            TypeExpr::list(TypeExpr::list(TypeExpr::list(t()))),
        )),
    }
    types.register_class(name, None, &[], properties)
}

/// Fill every property of a `container` instance.
///
/// Properties mentioning `element` get values from `generate`; every
/// sequence gets `width` elements and every mapping `width` entries keyed
/// `k0`, `k1`, .... Other properties stay `Null`.
pub fn populate_container(
    types: &TypeRegistry,
    container: TypeId,
    element: TypeId,
    width: usize,
    mut generate: impl FnMut() -> Value,
) -> Result<ObjectValue, ObjectError> {
    let mut builder = ObjectValue::builder(types, container)?;
    for prop in types.properties(container) {
        if !prop.ty.mentioned_types().contains(&element) {
            continue;
        }
        let value = fill(&prop.ty, width, &mut generate);
        builder = builder.set(types.interner().lookup(prop.name), value)?;
    }
    Ok(builder.finish())
}

fn fill(expr: &TypeExpr, width: usize, generate: &mut impl FnMut() -> Value) -> Value {
    match expr {
        TypeExpr::Named(_) => generate(),
        TypeExpr::List(elem) | TypeExpr::Set(elem) => {
            Value::list((0..width).map(|_| fill(elem, width, generate)).collect())
        }
        TypeExpr::Map { value, .. } => Value::map_from(
            (0..width).map(|i| (format!("k{i}"), fill(value, width, generate))),
        ),
    }
}

/// A generator of distinct points along the x axis.
///
/// Yields `Null` if `types` does not hold the geometry model.
pub fn point_generator<'a>(types: &'a TypeRegistry, geo: Geo) -> impl FnMut() -> Value + 'a {
    let mut next = 0.0;
    move || {
        next += 1.0;
        geo.point(types, next, 0.0).unwrap_or(Value::Null)
    }
}

/// The geometry model frozen into a registry, for tests that need no
/// containers.
pub fn geo_types() -> Result<(SharedRegistry<TypeRegistry>, Geo), RegistryError> {
    let mut types = TypeRegistry::new();
    let geo = register_geo(&mut types)?;
    Ok((SharedRegistry::new(types), geo))
}
