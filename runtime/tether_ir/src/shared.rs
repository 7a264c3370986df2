//! Shared, frozen registries.

use std::fmt;
use std::sync::Arc;

/// Thread-safe shared registry wrapper (immutable).
///
/// Registries are built with `&mut` access during start-up and then frozen
/// into a `SharedRegistry`; every reader holds a cheap clone.
pub struct SharedRegistry<T>(Arc<T>);

impl<T> SharedRegistry<T> {
    pub fn new(registry: T) -> Self {
        SharedRegistry(Arc::new(registry))
    }

    /// Check if two handles point at the same registry instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for SharedRegistry<T> {
    fn clone(&self) -> Self {
        SharedRegistry(Arc::clone(&self.0))
    }
}

impl<T> std::ops::Deref for SharedRegistry<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> From<T> for SharedRegistry<T> {
    fn from(registry: T) -> Self {
        SharedRegistry::new(registry)
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedRegistry({:?})", &*self.0)
    }
}
