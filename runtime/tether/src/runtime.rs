//! The runtime context object.
//!
//! A `Runtime` owns every piece of shared state: the frozen registries, the
//! candidate cache, the shape-plan cache and the diagnostics sink. It is
//! created once at start-up and handed to whatever needs to dispatch or
//! unpack; [`Runtime::shutdown`] tears it down and returns the diagnostics.

use std::sync::Arc;

use tether_diagnostic::{DiagnosticConfig, DiagnosticRecord, DiagnosticSink};
use tether_dispatch::{
    Candidate, DispatchConfig, ExtensionRegistry, ExtensionResult, FunctionSignature, Resolution,
    Resolver, SignatureIndex, VersionKey,
};
use tether_ir::{SharedRegistry, TypeId, TypeRegistry};
use tether_unpack::Unpacker;
use tether_value::Value;

/// Configuration for a [`Runtime`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub diagnostics: DiagnosticConfig,
    pub dispatch: DispatchConfig,
}

impl RuntimeConfig {
    /// Configuration for tests: diagnostics are kept but not logged.
    pub fn quiet() -> Self {
        RuntimeConfig {
            diagnostics: DiagnosticConfig::quiet(),
            dispatch: DispatchConfig::default(),
        }
    }
}

/// Builder for [`Runtime`].
pub struct RuntimeBuilder {
    extensions: ExtensionRegistry,
    config: RuntimeConfig,
}

impl RuntimeBuilder {
    /// Start from a fully populated extension registry.
    pub fn new(extensions: ExtensionRegistry) -> Self {
        RuntimeBuilder {
            extensions,
            config: RuntimeConfig::default(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Freeze the registry and create the runtime.
    pub fn build(self) -> Runtime {
        let types = self.extensions.types().clone();
        tracing::debug!(
            types = types.len(),
            functions = self.extensions.len(),
            "starting extension runtime"
        );
        Runtime {
            index: SignatureIndex::new(SharedRegistry::new(self.extensions)),
            unpacker: Unpacker::new(types.clone()),
            diagnostics: DiagnosticSink::new(self.config.diagnostics.clone()),
            config: self.config,
            types,
        }
    }
}

/// Shared state for dispatch, versioning and unpacking.
pub struct Runtime {
    types: SharedRegistry<TypeRegistry>,
    index: SignatureIndex,
    unpacker: Unpacker,
    diagnostics: DiagnosticSink,
    config: RuntimeConfig,
}

impl Runtime {
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        self.index.registry()
    }

    pub fn diagnostics(&self) -> &DiagnosticSink {
        &self.diagnostics
    }

    pub fn index(&self) -> &SignatureIndex {
        &self.index
    }

    pub fn unpacker(&self) -> &Unpacker {
        &self.unpacker
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// A resolver over this runtime's index and sink.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.index, &self.diagnostics, &self.config.dispatch)
    }

    /// See [`Resolver::try_invoke`].
    pub fn try_invoke(
        &self,
        receiver: &Value,
        name: &str,
        args: &[Value],
    ) -> Option<ExtensionResult> {
        self.resolver().try_invoke(receiver, name, args)
    }

    /// See [`Resolver::resolve`].
    pub fn resolve(&self, receiver: &Value, name: &str, args: &[Value]) -> Option<Resolution> {
        self.resolver().resolve(receiver, name, args)
    }

    /// Version key of `signature` under this runtime's type names.
    pub fn version_key(&self, signature: &FunctionSignature) -> VersionKey {
        VersionKey::of(signature, &self.types)
    }

    /// Current implementation for a stored key, following upgrade records.
    ///
    /// Unknown keys and upgrade cycles are recorded as warnings and yield
    /// `None`.
    pub fn resolve_key(&self, key: &VersionKey) -> Option<Arc<Candidate>> {
        match self.extensions().resolve_key(key) {
            Ok(candidate) => Some(candidate),
            Err(err) => {
                self.diagnostics.warning(err.code(), err.to_string());
                None
            }
        }
    }

    /// Replay a stored call record against the current implementation.
    ///
    /// The arguments are passed as recorded; no overload resolution takes
    /// place.
    pub fn invoke_key(
        &self,
        key: &VersionKey,
        receiver: &Value,
        args: &[Value],
    ) -> Option<ExtensionResult> {
        let candidate = self.resolve_key(key)?;
        let mut call_args = Vec::with_capacity(args.len().saturating_add(1));
        call_args.push(receiver.clone());
        call_args.extend_from_slice(args);
        Some(candidate.invoke(&call_args, &self.diagnostics))
    }

    /// See [`Unpacker::unpack_value`].
    pub fn unpack(&self, container: &Value, target: TypeId) -> Vec<Value> {
        self.unpacker.unpack_value(container, target)
    }

    /// Tear down the runtime and return every diagnostic it recorded.
    pub fn shutdown(self) -> Vec<DiagnosticRecord> {
        let Runtime {
            index,
            unpacker,
            diagnostics,
            ..
        } = self;
        tracing::debug!(
            cached_candidate_sets = index.cached_len(),
            cached_shape_plans = unpacker.cached_plans(),
            diagnostics = diagnostics.len(),
            rejected = diagnostics.rejected(),
            "shutting down extension runtime"
        );
        drop(index);
        drop(unpacker);
        diagnostics.into_records()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("index", &self.index)
            .field("unpacker", &self.unpacker)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}
