//! Tether - runtime dispatch for extension functions.
//!
//! Domain behavior is attached to flat data classes through free
//! "extension" functions whose first parameter is the receiver. Tether
//! picks the right overload from the receiver's *runtime* type, gives
//! every signature a stable version key for replaying stored call records,
//! and pulls typed elements out of container objects for versioning
//! harnesses.
//!
//! # Usage
//!
//! ```text
//! let mut types = TypeRegistry::new();
//! let line = types.register_class("geo.Line", None, &[], vec![])?;
//!
//! let mut extensions = ExtensionRegistry::new(SharedRegistry::new(types));
//! extensions.register("geo.Query", "Length", &[line], TypeId::FLOAT, |call| {
//!     Ok(Value::Float(1.0))
//! })?;
//!
//! let runtime = RuntimeBuilder::new(extensions).build();
//! match runtime.try_invoke(&receiver, "Length", &[]) {
//!     Some(Ok(length)) => ...,
//!     Some(Err(callee_failure)) => ...,
//!     None => { /* no overload; see runtime.diagnostics() */ }
//! }
//! let records = runtime.shutdown();
//! ```
//!
//! # Logging
//!
//! All crates log through `tracing`. Call [`init_tracing`] once and set
//! `RUST_LOG` (e.g. `RUST_LOG=tether_dispatch=trace`) to see output.

mod runtime;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::sync::Once;

pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};

pub use tether_diagnostic::{
    DiagnosticConfig, DiagnosticRecord, DiagnosticSink, ErrorCode, Severity,
};
pub use tether_dispatch::{
    Candidate, CandidateSet, DispatchConfig, ExtensionError, ExtensionFn, ExtensionRegistry,
    ExtensionResult, FunctionSignature, Invocation, KeyLookupError, KeyParts, RegistrationError,
    Resolution, Resolver, SignatureIndex, VersionKey,
};
pub use tether_ir::{
    Conversion, Name, RegistryError, SharedRegistry, TypeExpr, TypeId, TypeKind, TypeRegistry,
};
pub use tether_unpack::{Shape, ShapePlan, Unpacker};
pub use tether_value::{ObjectBuilder, ObjectError, ObjectValue, Value};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let installed = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
            if installed.is_err() {
                tracing::debug!("a global tracing subscriber is already installed");
            }
        }
    });
}
