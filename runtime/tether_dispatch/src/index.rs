//! Candidate sets per (receiver type, function name).
//!
//! Looking up `Length` on a `geo.ArcLine` must also see overloads declared
//! on `geo.Line`, `geo.ICurve`, `geo.IGeometry` and `std.Object`. The index
//! walks the hierarchy once per key and caches the merged, ordered set under
//! the *requested* receiver type.
//!
//! # Concurrency
//!
//! The cache is a sharded `DashMap`. A miss builds the set without holding
//! any lock and then publishes it only if the key is still absent, so two
//! threads racing on the same key build equal sets and one of them wins.
//! Unrelated keys never contend on a global lock.

use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::{FxBuildHasher, FxHashSet};
use tether_ir::{Name, SharedRegistry, TypeId, TypeRegistry};

use crate::{Candidate, ExtensionRegistry};

/// Ordered, deduplicated overloads visible for one (receiver type, name).
///
/// Cloning is O(1).
#[derive(Clone, Debug)]
pub struct CandidateSet(Arc<[Arc<Candidate>]>);

impl CandidateSet {
    fn new(candidates: Vec<Arc<Candidate>>) -> Self {
        CandidateSet(candidates.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Candidate>> {
        self.0.get(index)
    }

    /// Candidates in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Candidate>> {
        self.0.iter()
    }

    /// Candidates taking exactly `arity` parameters, receiver included.
    pub fn with_arity(&self, arity: usize) -> impl Iterator<Item = &Arc<Candidate>> {
        self.0.iter().filter(move |c| c.arity() == arity)
    }

    /// Check if two sets share the same backing storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for CandidateSet {
    fn default() -> Self {
        CandidateSet::new(Vec::new())
    }
}

impl PartialEq for CandidateSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl Eq for CandidateSet {}

/// Lazily built, process-lifetime cache of candidate sets.
pub struct SignatureIndex {
    registry: SharedRegistry<ExtensionRegistry>,
    cache: DashMap<(TypeId, Name), CandidateSet, FxBuildHasher>,
}

impl SignatureIndex {
    pub fn new(registry: SharedRegistry<ExtensionRegistry>) -> Self {
        SignatureIndex {
            registry,
            cache: DashMap::with_hasher(FxBuildHasher),
        }
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn types(&self) -> &TypeRegistry {
        self.registry.types()
    }

    /// All overloads named `name` visible on `receiver`.
    ///
    /// An unknown name or a type with no such overloads yields an empty
    /// set, which is cached like any other.
    pub fn candidates_for(&self, receiver: TypeId, name: Name) -> CandidateSet {
        let key = (receiver, name);
        if let Some(hit) = self.cache.get(&key) {
            return hit.value().clone();
        }

        let built = self.build(receiver, name);
        self.cache.entry(key).or_insert(built).value().clone()
    }

    /// Same as [`candidates_for`](Self::candidates_for), by function name
    /// string. Names never interned have no candidates.
    pub fn candidates_named(&self, receiver: TypeId, name: &str) -> CandidateSet {
        match self.types().interner().get(name) {
            Some(name) => self.candidates_for(receiver, name),
            None => CandidateSet::default(),
        }
    }

    fn build(&self, receiver: TypeId, name: Name) -> CandidateSet {
        let mut merged: Vec<Arc<Candidate>> = self
            .types()
            .supertypes(receiver)
            .into_iter()
            .flat_map(|(ty, _)| self.registry.by_receiver(ty, name).iter().cloned())
            .collect();
        merged.sort_by_key(|c| c.order());

        let mut seen_params = FxHashSet::default();
        merged.retain(|c| seen_params.insert(c.signature().params.clone()));

        tracing::trace!(
            receiver = self.types().full_name(receiver),
            function = self.types().interner().lookup(name),
            candidates = merged.len(),
            "built candidate set"
        );
        CandidateSet::new(merged)
    }

    /// Number of cached (receiver type, name) keys.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_cached(&self, receiver: TypeId, name: Name) -> bool {
        self.cache.contains_key(&(receiver, name))
    }
}

impl std::fmt::Debug for SignatureIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureIndex")
            .field("registry", &*self.registry)
            .field("cached", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
