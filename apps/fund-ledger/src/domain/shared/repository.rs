//! Persistence primitives shared by repository ports.

use thiserror::Error;

/// A stored value together with its optimistic-concurrency version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    /// Stored value.
    pub value: T,
    /// Version at read time. Incremented by every committed write.
    pub version: u64,
}

impl<T> Versioned<T> {
    /// Wrap a value with its version.
    #[must_use]
    pub const fn new(value: T, version: u64) -> Self {
        Self { value, version }
    }

    /// Discard the version.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Errors returned by repository ports.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// A row changed since it was read; the unit of work must be retried.
    #[error("version conflict on {entity} {id}: expected {expected:?}, found {actual:?}")]
    Conflict {
        /// Entity type.
        entity: String,
        /// Entity ID.
        id: String,
        /// Version the writer expected (`None` for a new row).
        expected: Option<u64>,
        /// Version actually stored (`None` if absent).
        actual: Option<u64>,
    },

    /// Row with this ID already exists.
    #[error("{entity} already exists: {id}")]
    Duplicate {
        /// Entity type.
        entity: String,
        /// Entity ID.
        id: String,
    },

    /// Row not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity type.
        entity: String,
        /// Entity ID.
        id: String,
    },

    /// Write would violate a storage-level constraint.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// Backend failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    /// Returns true for optimistic-concurrency conflicts.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_detected() {
        let err = RepositoryError::Conflict {
            entity: "position".to_string(),
            id: "inv-1/fund-a".to_string(),
            expected: Some(1),
            actual: Some(2),
        };
        assert!(err.is_conflict());
        assert!(err.to_string().contains("inv-1/fund-a"));
        assert!(!RepositoryError::Storage("disk".to_string()).is_conflict());
    }

    #[test]
    fn versioned_into_inner() {
        let v = Versioned::new("row", 3);
        assert_eq!(v.version, 3);
        assert_eq!(v.into_inner(), "row");
    }
}
