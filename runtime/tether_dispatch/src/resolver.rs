//! Runtime overload selection.
//!
//! Given a receiver value, a function name and the remaining arguments, the
//! resolver looks up the candidate set for the receiver's runtime type,
//! drops overloads of the wrong arity or with an incompatible parameter,
//! and picks the candidate with the smallest summed conversion distance.
//!
//! Distances per position:
//!
//! | Argument vs. declared parameter | Distance |
//! |---|---|
//! | same type | 0 |
//! | base class / interface `n` steps up | `n` |
//! | declared as `std.Object` | `universal_cost` |
//! | `Null` for a typed non-primitive parameter | 0 |
//! | `Null` for `std.Object` | `universal_cost` |
//!
//! Ties go to the candidate registered first. When nothing survives, a
//! warning is pushed to the diagnostics sink and the call yields `None`.

use std::sync::Arc;

use tether_diagnostic::{DiagnosticSink, ErrorCode};
use tether_ir::{TypeId, TypeRegistry};
use tether_value::Value;

use crate::{Candidate, ExtensionResult, FunctionSignature, SignatureIndex, VersionKey};

/// Resolver tuning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Push `E1001`/`E1002` when a call cannot be bound.
    pub report_unresolved: bool,
    /// Distance of one parameter declared as the universal top type.
    /// Raised to one past the registry height when set lower, so a typed
    /// parameter always costs less.
    pub universal_cost: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            report_unresolved: true,
            universal_cost: 1024,
        }
    }
}

impl DispatchConfig {
    /// Resolve without reporting unbound calls.
    pub fn silent() -> Self {
        DispatchConfig {
            report_unresolved: false,
            ..Self::default()
        }
    }
}

/// The overload a call binds to.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub candidate: Arc<Candidate>,
    /// Summed distance; lower is more specific.
    pub score: u32,
}

impl Resolution {
    pub fn key(&self) -> &VersionKey {
        self.candidate.key()
    }

    pub fn signature(&self) -> &FunctionSignature {
        self.candidate.signature()
    }
}

/// Picks and invokes extension overloads.
///
/// Borrowing and cheap to create; all state lives in the index and sink.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a SignatureIndex,
    diagnostics: &'a DiagnosticSink,
    config: &'a DispatchConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(
        index: &'a SignatureIndex,
        diagnostics: &'a DiagnosticSink,
        config: &'a DispatchConfig,
    ) -> Self {
        Resolver {
            index,
            diagnostics,
            config,
        }
    }

    /// Select the overload `name(receiver, args..)` would bind to, without
    /// running it.
    #[tracing::instrument(level = "debug", skip_all, fields(function = name))]
    pub fn resolve(&self, receiver: &Value, name: &str, args: &[Value]) -> Option<Resolution> {
        let Some(receiver_type) = receiver.runtime_type() else {
            self.report(ErrorCode::E1002, || {
                format!("extension function `{name}` called on a null receiver")
            });
            return None;
        };

        let types = self.index.types();
        let universal_cost = self.universal_cost(types);
        let candidates = self.index.candidates_named(receiver_type, name);
        let arity = args.len().saturating_add(1);

        let mut best: Option<Resolution> = None;
        for candidate in candidates.with_arity(arity) {
            let Some(score) = score(types, universal_cost, candidate, receiver_type, args) else {
                continue;
            };
            // Strict comparison keeps the earlier-declared candidate on ties.
            if best.as_ref().map_or(true, |b| score < b.score) {
                best = Some(Resolution {
                    candidate: Arc::clone(candidate),
                    score,
                });
            }
        }

        match &best {
            Some(resolution) => {
                tracing::debug!(key = %resolution.key(), score = resolution.score, "resolved");
            }
            None => self.report(ErrorCode::E1001, || {
                unresolved_message(types, name, receiver_type, args)
            }),
        }
        best
    }

    /// Resolve and run `name(receiver, args..)`.
    ///
    /// `None` means no overload applies (already reported). `Some(Err(_))`
    /// is the callee's own failure, returned untouched.
    pub fn try_invoke(
        &self,
        receiver: &Value,
        name: &str,
        args: &[Value],
    ) -> Option<ExtensionResult> {
        let resolution = self.resolve(receiver, name, args)?;
        let mut call_args = Vec::with_capacity(args.len().saturating_add(1));
        call_args.push(receiver.clone());
        call_args.extend_from_slice(args);
        Some(resolution.candidate.invoke(&call_args, self.diagnostics))
    }

    fn universal_cost(&self, types: &TypeRegistry) -> u32 {
        self.config
            .universal_cost
            .max(types.height().saturating_add(1))
    }

    fn report(&self, code: ErrorCode, message: impl FnOnce() -> String) {
        if self.config.report_unresolved {
            self.diagnostics.warning(code, message());
        }
    }
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

/// Summed distance, or `None` if any position is incompatible.
fn score(
    types: &TypeRegistry,
    universal_cost: u32,
    candidate: &Candidate,
    receiver_type: TypeId,
    args: &[Value],
) -> Option<u32> {
    let params = &candidate.signature().params;
    let (receiver_param, rest) = params.split_first()?;

    let mut total = types
        .conversion(receiver_type, *receiver_param)?
        .cost(universal_cost);
    for (param, arg) in rest.iter().zip(args) {
        let cost = match arg.runtime_type() {
            Some(arg_type) => types
                .conversion(arg_type, *param)?
                .cost(universal_cost),
            None if param.is_primitive() => return None,
            None if *param == TypeId::OBJECT => universal_cost,
            None => 0,
        };
        total = total.saturating_add(cost);
    }
    Some(total)
}

fn unresolved_message(
    types: &TypeRegistry,
    name: &str,
    receiver_type: TypeId,
    args: &[Value],
) -> String {
    let mut message = format!(
        "extension function `{name}` not found for `{}` with arguments (",
        types.full_name(receiver_type)
    );
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            message.push_str(", ");
        }
        match arg.runtime_type() {
            Some(ty) => message.push_str(types.full_name(ty)),
            None => message.push_str("null"),
        }
    }
    message.push(')');
    message
}
