//! Version keys.
//!
//! A version key fingerprints the call-site-visible shape of an overload:
//! declaring type, function name and ordered parameter type names. The
//! return type is deliberately absent so that refining a return type does
//! not orphan stored call records.
//!
//! Format (fixed; every stored key depends on it):
//!
//! ```text
//! geo.Query::Length(geo.Line)
//! geo.Modify::Translate(geo.Point,geo.Vector)
//! ```
//!
//! The characters `\`, `:`, `(`, `)` and `,` are backslash-escaped inside
//! each component, so distinct signatures never share a key.

use std::fmt;

use serde::{Deserialize, Serialize};
use tether_ir::TypeRegistry;

use crate::FunctionSignature;

/// Stable fingerprint of a function signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionKey(String);

/// Components recovered from a version key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyParts {
    pub declaring_type: String,
    pub name: String,
    pub params: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Stage {
    Declaring,
    Name,
    Params,
    Done,
}

fn is_reserved(c: char) -> bool {
    matches!(c, '\\' | ':' | '(' | ')' | ',')
}

fn push_escaped(out: &mut String, component: &str) {
    for c in component.chars() {
        if is_reserved(c) {
            out.push('\\');
        }
        out.push(c);
    }
}

impl VersionKey {
    /// Compute the key of a signature, resolving names through `types`.
    pub fn of(signature: &FunctionSignature, types: &TypeRegistry) -> Self {
        let interner = types.interner();
        Self::from_parts(
            interner.lookup(signature.declaring_type),
            interner.lookup(signature.name),
            signature.params.iter().map(|&p| types.full_name(p)),
        )
    }

    /// Compute a key from already-resolved names.
    pub fn from_parts<'a>(
        declaring_type: &str,
        name: &str,
        params: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut key = String::with_capacity(declaring_type.len() + name.len() + 16);
        push_escaped(&mut key, declaring_type);
        key.push_str("::");
        push_escaped(&mut key, name);
        key.push('(');
        for (i, param) in params.into_iter().enumerate() {
            if i > 0 {
                key.push(',');
            }
            push_escaped(&mut key, param);
        }
        key.push(')');
        VersionKey(key)
    }

    /// Wrap a key string read back from storage. No validation is done;
    /// a malformed key simply matches nothing.
    pub fn from_stored(key: impl Into<String>) -> Self {
        VersionKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the key back into its components, or `None` if it is not in
    /// the canonical format.
    pub fn parse(&self) -> Option<KeyParts> {
        let mut parts = KeyParts::default();
        let mut current = String::new();
        let mut stage = Stage::Declaring;
        let mut chars = self.0.chars();

        while let Some(c) = chars.next() {
            match (stage, c) {
                (Stage::Done, _) => return None,
                (_, '\\') => current.push(chars.next()?),
                (Stage::Declaring, ':') => {
                    if chars.next()? != ':' {
                        return None;
                    }
                    parts.declaring_type = std::mem::take(&mut current);
                    stage = Stage::Name;
                }
                (Stage::Name, '(') => {
                    parts.name = std::mem::take(&mut current);
                    stage = Stage::Params;
                }
                (Stage::Params, ',') => parts.params.push(std::mem::take(&mut current)),
                (Stage::Params, ')') => {
                    if !current.is_empty() || !parts.params.is_empty() {
                        parts.params.push(std::mem::take(&mut current));
                    }
                    stage = Stage::Done;
                }
                (_, c) if is_reserved(c) => return None,
                (_, c) => current.push(c),
            }
        }

        (stage == Stage::Done).then_some(parts)
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VersionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<VersionKey> for String {
    fn from(key: VersionKey) -> Self {
        key.0
    }
}
