//! Extension function dispatch.
//!
//! Extension functions are free functions whose first parameter is the
//! receiver. Several overloads may share a name; this crate picks one at
//! runtime from the *runtime* types of the receiver and arguments.
//!
//! # Architecture
//!
//! - `ExtensionRegistry`: every registered overload, keyed by
//!   (receiver type, name) and by version key; built once at start-up
//! - `SignatureIndex`: per (receiver type, name) candidate sets covering the
//!   whole hierarchy, built lazily and cached
//! - `Resolver`: scores candidates by specificity and invokes the winner
//! - `VersionKey`: stable fingerprint of a signature, used to correlate
//!   stored call records with the current implementation
//!
//! Failing to find an overload is an ordinary outcome: it is reported to the
//! `DiagnosticSink` and surfaces as `None`, never as an error or panic.

mod extension;
mod index;
mod registry;
mod resolver;
mod signature;
mod version_key;

pub use extension::{ExtensionError, ExtensionFn, ExtensionResult, Invocation};
pub use index::{CandidateSet, SignatureIndex};
pub use registry::{Candidate, ExtensionRegistry, KeyLookupError, RegistrationError};
pub use resolver::{DispatchConfig, Resolution, Resolver};
pub use signature::FunctionSignature;
pub use version_key::{KeyParts, VersionKey};
