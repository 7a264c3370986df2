//! Type metadata registry.
//!
//! The `TypeRegistry` is the runtime's only window onto the object model:
//! which types exist, what they derive from and implement, and which
//! properties they declare. It is built once, before any dispatch happens,
//! and then shared read-only.
//!
//! # Design
//!
//! - Dense `Vec` storage indexed by `TypeId`, `FxHashMap` for name lookup
//! - Properties are flattened at registration (inherited first), so layout
//!   lookups never walk the hierarchy
//! - Bases and interfaces must already be registered, so the hierarchy is
//!   acyclic by construction

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{Name, SharedInterner, TypeExpr, TypeId};

/// Reserved name of the free-form key/value bag every domain object carries.
pub const CUSTOM_DATA: &str = "CustomData";

/// Reserved name of the attached-fragment bag every domain object carries.
pub const FRAGMENTS: &str = "Fragments";

/// The kind of a registered type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// One of the well-known `std.*` types.
    Builtin,
    /// A concrete data class; may have a single base class.
    Class,
    /// An interface; may extend other interfaces.
    Interface,
}

/// A declared property of a class.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyDef {
    pub name: Name,
    pub ty: TypeExpr,
}

impl PropertyDef {
    pub fn new(name: Name, ty: TypeExpr) -> Self {
        PropertyDef { name, ty }
    }
}

/// A registered type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeEntry {
    pub id: TypeId,
    /// Namespace-qualified name, e.g. `geo.Point`.
    pub full_name: Name,
    pub kind: TypeKind,
    pub base: Option<TypeId>,
    /// Directly implemented (or, for interfaces, extended) interfaces.
    pub interfaces: Vec<TypeId>,
    /// All properties, inherited ones first.
    pub properties: Vec<PropertyDef>,
    /// Length of the longest chain of supertypes above this type.
    pub depth: u32,
}

impl TypeEntry {
    fn direct_supertypes(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.base.iter().chain(self.interfaces.iter()).copied()
    }
}

/// How a runtime type converts to a declared parameter type.
///
/// Ordered from most to least specific.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Conversion {
    Exact,
    /// Through a base class or implemented interface, `n` steps up.
    Supertype(u32),
    /// The declared type is the universal `std.Object`.
    Universal,
}

impl Conversion {
    /// Distance contributed by one parameter position.
    pub fn cost(self, universal_cost: u32) -> u32 {
        match self {
            Conversion::Exact => 0,
            Conversion::Supertype(depth) => depth,
            Conversion::Universal => universal_cost,
        }
    }
}

/// Errors raised while registering types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("type `{0}` is already registered")]
    DuplicateType(String),
    #[error("unknown type id {0:?}")]
    UnknownType(TypeId),
    #[error("`{name}` cannot derive from `{base}`: base types must be classes")]
    BaseNotClass { name: String, base: String },
    #[error("`{name}` lists `{interface}` as an interface, but it is not one")]
    NotAnInterface { name: String, interface: String },
    #[error("property `{property}` is declared more than once on `{type_name}`")]
    DuplicateProperty { type_name: String, property: String },
    #[error("property name `{property}` on `{type_name}` is reserved for ancillary data")]
    ReservedProperty { type_name: String, property: String },
}

/// Registry of all types known to the runtime.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    interner: SharedInterner,
    entries: Vec<TypeEntry>,
    by_name: FxHashMap<Name, TypeId>,
    height: u32,
}

impl TypeRegistry {
    /// Create a registry holding only the well-known types.
    pub fn new() -> Self {
        Self::with_interner(SharedInterner::new())
    }

    /// Create a registry that interns names into an existing interner.
    pub fn with_interner(interner: SharedInterner) -> Self {
        let mut registry = TypeRegistry {
            interner,
            entries: Vec::with_capacity(64),
            by_name: FxHashMap::default(),
            height: 0,
        };
        for (id, full_name) in TypeId::WELL_KNOWN {
            let full_name = registry.interner.intern(full_name);
            registry.by_name.insert(full_name, id);
            registry.entries.push(TypeEntry {
                id,
                full_name,
                kind: TypeKind::Builtin,
                base: None,
                interfaces: Vec::new(),
                properties: Vec::new(),
                depth: 0,
            });
        }
        registry
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Intern a name into this registry's interner.
    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Register a data class.
    ///
    /// `properties` are the class's own declared properties; inherited
    /// properties from `base` are prepended automatically.
    pub fn register_class(
        &mut self,
        full_name: &str,
        base: Option<TypeId>,
        interfaces: &[TypeId],
        properties: Vec<(&str, TypeExpr)>,
    ) -> Result<TypeId, RegistryError> {
        let name = self.check_new_name(full_name)?;

        let mut all_properties = match base {
            Some(base) => {
                let entry = self.entry(base).ok_or(RegistryError::UnknownType(base))?;
                if entry.kind != TypeKind::Class {
                    return Err(RegistryError::BaseNotClass {
                        name: full_name.to_owned(),
                        base: self.full_name(base).to_owned(),
                    });
                }
                entry.properties.clone()
            }
            None => Vec::new(),
        };
        self.check_interfaces(full_name, interfaces)?;

        for (prop_name, ty) in properties {
            if prop_name == CUSTOM_DATA || prop_name == FRAGMENTS {
                return Err(RegistryError::ReservedProperty {
                    type_name: full_name.to_owned(),
                    property: prop_name.to_owned(),
                });
            }
            if let Some(unknown) = ty.mentioned_types().into_iter().find(|t| !self.contains(*t)) {
                return Err(RegistryError::UnknownType(unknown));
            }
            let prop_name = self.interner.intern(prop_name);
            if all_properties.iter().any(|p| p.name == prop_name) {
                return Err(RegistryError::DuplicateProperty {
                    type_name: full_name.to_owned(),
                    property: self.interner.lookup(prop_name).to_owned(),
                });
            }
            all_properties.push(PropertyDef::new(prop_name, ty));
        }

        Ok(self.push_entry(name, TypeKind::Class, base, interfaces, all_properties))
    }

    /// Register an interface extending zero or more other interfaces.
    pub fn register_interface(
        &mut self,
        full_name: &str,
        extends: &[TypeId],
    ) -> Result<TypeId, RegistryError> {
        let name = self.check_new_name(full_name)?;
        self.check_interfaces(full_name, extends)?;
        Ok(self.push_entry(name, TypeKind::Interface, None, extends, Vec::new()))
    }

    fn check_new_name(&self, full_name: &str) -> Result<Name, RegistryError> {
        let name = self.interner.intern(full_name);
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateType(full_name.to_owned()));
        }
        Ok(name)
    }

    fn check_interfaces(&self, full_name: &str, interfaces: &[TypeId]) -> Result<(), RegistryError> {
        for &interface in interfaces {
            let entry = self
                .entry(interface)
                .ok_or(RegistryError::UnknownType(interface))?;
            if entry.kind != TypeKind::Interface {
                return Err(RegistryError::NotAnInterface {
                    name: full_name.to_owned(),
                    interface: self.full_name(interface).to_owned(),
                });
            }
        }
        Ok(())
    }

    fn push_entry(
        &mut self,
        full_name: Name,
        kind: TypeKind,
        base: Option<TypeId>,
        interfaces: &[TypeId],
        properties: Vec<PropertyDef>,
    ) -> TypeId {
        let raw = u32::try_from(self.entries.len()).unwrap_or(u32::MAX);
        let id = TypeId::new(raw);
        let depth = base
            .iter()
            .chain(interfaces)
            .filter_map(|&parent| self.entry(parent))
            .map(|parent| parent.depth.saturating_add(1))
            .max()
            .unwrap_or(0);
        self.height = self.height.max(depth);
        tracing::trace!(
            type_name = self.interner.lookup(full_name),
            ?id,
            ?kind,
            "registered type"
        );
        self.by_name.insert(full_name, id);
        self.entries.push(TypeEntry {
            id,
            full_name,
            kind,
            base,
            interfaces: interfaces.to_vec(),
            properties,
            depth,
        });
        id
    }

    pub fn contains(&self, id: TypeId) -> bool {
        id.index() < self.entries.len()
    }

    pub fn entry(&self, id: TypeId) -> Option<&TypeEntry> {
        self.entries.get(id.index())
    }

    /// Find a type by its full name.
    pub fn lookup(&self, full_name: &str) -> Option<TypeId> {
        let name = self.interner.get(full_name)?;
        self.by_name.get(&name).copied()
    }

    /// Full name of a type; unknown ids render as the empty string.
    pub fn full_name(&self, id: TypeId) -> &str {
        self.entry(id)
            .map_or("", |entry| self.interner.lookup(entry.full_name))
    }

    /// All properties of a type, inherited first. Empty for non-classes.
    pub fn properties(&self, id: TypeId) -> &[PropertyDef] {
        self.entry(id)
            .map(|entry| entry.properties.as_slice())
            .unwrap_or_default()
    }

    /// Index of a property in the type's flattened layout.
    pub fn property_index(&self, id: TypeId, property: Name) -> Option<usize> {
        self.properties(id).iter().position(|p| p.name == property)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Longest supertype chain of any registered type. Every
    /// `Conversion::Supertype` distance is at most this.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if only the well-known types are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|entry| entry.id.is_well_known())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> {
        self.entries.iter()
    }

    /// Breadth-first walk over a type and everything it derives from or
    /// implements, paired with the number of steps taken.
    ///
    /// The type itself comes first at distance 0. Each supertype appears
    /// once, at its shortest distance. `std.Object` is appended last for
    /// every type other than itself.
    pub fn supertypes(&self, id: TypeId) -> Vec<(TypeId, u32)> {
        let mut out = vec![(id, 0)];
        let mut seen = FxHashSet::default();
        seen.insert(id);
        let mut queue = VecDeque::from([(id, 0u32)]);

        while let Some((current, depth)) = queue.pop_front() {
            let Some(entry) = self.entry(current) else {
                continue;
            };
            for parent in entry.direct_supertypes() {
                if seen.insert(parent) {
                    let next = depth.saturating_add(1);
                    out.push((parent, next));
                    queue.push_back((parent, next));
                }
            }
        }

        if seen.insert(TypeId::OBJECT) {
            let last = out.last().map_or(0, |&(_, d)| d);
            out.push((TypeId::OBJECT, last.saturating_add(1)));
        }
        out
    }

    /// How a value of type `runtime` converts to a parameter declared as
    /// `declared`, or `None` if it cannot.
    pub fn conversion(&self, runtime: TypeId, declared: TypeId) -> Option<Conversion> {
        if runtime == declared {
            return Some(Conversion::Exact);
        }
        if declared == TypeId::OBJECT {
            return Some(Conversion::Universal);
        }
        self.supertypes(runtime)
            .into_iter()
            .find(|&(t, _)| t == declared)
            .map(|(_, depth)| Conversion::Supertype(depth))
    }

    /// Check if a value of type `runtime` is an instance of `declared`.
    pub fn is_instance_of(&self, runtime: TypeId, declared: TypeId) -> bool {
        self.conversion(runtime, declared).is_some()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
