//! Registry of extension functions.
//!
//! Stores every registered overload keyed two ways: by
//! (declared receiver type, function name) for dispatch, and by
//! `VersionKey` for replaying stored call records. Upgrade records map keys
//! of signatures that no longer exist onto their replacements.
//!
//! The registry is populated during start-up and then frozen into a
//! `SharedRegistry`, so the candidate sets derived from it never go stale.

use std::fmt;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tether_diagnostic::{DiagnosticSink, ErrorCode};
use tether_ir::{Name, SharedRegistry, TypeId, TypeRegistry};
use tether_value::Value;

use crate::{ExtensionFn, ExtensionResult, FunctionSignature, Invocation, VersionKey};

/// One registered overload.
pub struct Candidate {
    signature: FunctionSignature,
    key: VersionKey,
    /// Registration sequence number; lower wins specificity ties.
    order: u32,
    function: ExtensionFn,
}

impl Candidate {
    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    pub fn key(&self) -> &VersionKey {
        &self.key
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn arity(&self) -> usize {
        self.signature.arity()
    }

    /// Run the function body. `args` holds the receiver first.
    pub fn invoke(&self, args: &[Value], diagnostics: &DiagnosticSink) -> ExtensionResult {
        (self.function)(&Invocation::new(self, args, diagnostics))
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("key", &self.key)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Errors raised while registering extension functions.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("extension function `{0}` must take at least a receiver parameter")]
    MissingReceiver(String),
    #[error("extension function name must not be empty")]
    EmptyName,
    #[error("unknown type id {0:?} in extension signature")]
    UnknownType(TypeId),
    #[error("an extension function with key `{0}` is already registered")]
    DuplicateKey(VersionKey),
}

/// Errors raised when replaying a stored version key.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum KeyLookupError {
    #[error("no extension function or upgrade record for `{0}`")]
    Unknown(VersionKey),
    #[error("upgrade records for `{0}` form a cycle")]
    UpgradeCycle(VersionKey),
}

impl KeyLookupError {
    pub fn code(&self) -> ErrorCode {
        match self {
            KeyLookupError::Unknown(_) => ErrorCode::E2001,
            KeyLookupError::UpgradeCycle(_) => ErrorCode::E2002,
        }
    }
}

/// Registry for extension functions.
pub struct ExtensionRegistry {
    types: SharedRegistry<TypeRegistry>,
    by_receiver: FxHashMap<(TypeId, Name), Vec<Arc<Candidate>>>,
    by_key: FxHashMap<VersionKey, Arc<Candidate>>,
    /// Old key -> replacement key.
    upgrades: FxHashMap<VersionKey, VersionKey>,
    next_order: u32,
}

impl ExtensionRegistry {
    /// Create an empty registry over a frozen type registry.
    pub fn new(types: SharedRegistry<TypeRegistry>) -> Self {
        ExtensionRegistry {
            types,
            by_receiver: FxHashMap::default(),
            by_key: FxHashMap::default(),
            upgrades: FxHashMap::default(),
            next_order: 0,
        }
    }

    pub fn types(&self) -> &SharedRegistry<TypeRegistry> {
        &self.types
    }

    /// Register an extension function.
    ///
    /// # Arguments
    /// * `declaring_type` - Full name of the declaring module (e.g. `geo.Query`)
    /// * `name` - Function name (e.g. `Length`)
    /// * `params` - Parameter types, receiver first
    /// * `returns` - Return type (informational; not part of the key)
    /// * `function` - The body
    pub fn register<F>(
        &mut self,
        declaring_type: &str,
        name: &str,
        params: &[TypeId],
        returns: TypeId,
        function: F,
    ) -> Result<VersionKey, RegistrationError>
    where
        F: Fn(&Invocation<'_>) -> ExtensionResult + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        let Some(&receiver) = params.first() else {
            return Err(RegistrationError::MissingReceiver(name.to_owned()));
        };
        if let Some(&unknown) = params
            .iter()
            .chain(std::iter::once(&returns))
            .find(|t| !self.types.contains(**t))
        {
            return Err(RegistrationError::UnknownType(unknown));
        }

        let signature = FunctionSignature::new(
            self.types.intern(declaring_type),
            self.types.intern(name),
            params.to_vec(),
            returns,
        );
        let key = VersionKey::of(&signature, &self.types);
        if self.by_key.contains_key(&key) {
            return Err(RegistrationError::DuplicateKey(key));
        }

        let order = self.next_order;
        self.next_order = self.next_order.saturating_add(1);
        tracing::trace!(%key, order, "registered extension function");

        let candidate = Arc::new(Candidate {
            key: key.clone(),
            order,
            function: Arc::new(function),
            signature,
        });
        let name = candidate.signature.name;
        self.by_receiver
            .entry((receiver, name))
            .or_default()
            .push(Arc::clone(&candidate));
        self.by_key.insert(key.clone(), candidate);
        Ok(key)
    }

    /// Record that calls stored under `old` should now go to `new`.
    ///
    /// `new` may itself have been upgraded later; lookups follow the chain.
    pub fn record_upgrade(&mut self, old: VersionKey, new: VersionKey) {
        tracing::trace!(%old, %new, "recorded upgrade");
        self.upgrades.insert(old, new);
    }

    /// Candidates whose declared receiver type is exactly `receiver`, in
    /// registration order.
    pub fn by_receiver(&self, receiver: TypeId, name: Name) -> &[Arc<Candidate>] {
        self.by_receiver
            .get(&(receiver, name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn by_key(&self, key: &VersionKey) -> Option<&Arc<Candidate>> {
        self.by_key.get(key)
    }

    /// Find the current implementation for a stored key, following upgrade
    /// records.
    pub fn resolve_key(&self, key: &VersionKey) -> Result<Arc<Candidate>, KeyLookupError> {
        let mut current = key;
        let mut visited = FxHashSet::default();
        loop {
            if let Some(candidate) = self.by_key.get(current) {
                return Ok(Arc::clone(candidate));
            }
            if !visited.insert(current) {
                return Err(KeyLookupError::UpgradeCycle(key.clone()));
            }
            match self.upgrades.get(current) {
                Some(next) => current = next,
                None => return Err(KeyLookupError::Unknown(key.clone())),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// All candidates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Candidate>> {
        let mut all: Vec<&Arc<Candidate>> = self.by_key.values().collect();
        all.sort_by_key(|c| c.order);
        all.into_iter()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("functions", &self.by_key.len())
            .field("upgrades", &self.upgrades.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
