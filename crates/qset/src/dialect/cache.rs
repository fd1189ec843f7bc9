use super::Dialect;
use crate::connection::{Connection, ConnectionKind};
use crate::error::QsResult;
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

/// Memo of connection kind -> dialect.
///
/// Entries are never invalidated: the dialect is a pure function of the
/// connection implementation. Resolution failures are not cached.
#[derive(Debug, Default)]
pub struct DialectCache {
    entries: RwLock<HashMap<ConnectionKind, Dialect>>,
}

impl DialectCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> &'static DialectCache {
        static GLOBAL: OnceLock<DialectCache> = OnceLock::new();
        GLOBAL.get_or_init(DialectCache::new)
    }

    /// Cached dialect for `kind`, if resolved already.
    pub fn get(&self, kind: ConnectionKind) -> Option<Dialect> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .copied()
    }

    /// Resolve the dialect of `conn`, computing it at most once per kind.
    pub fn resolve<C: Connection + ?Sized>(&self, conn: &C) -> QsResult<Dialect> {
        self.get_or_try_insert(conn.kind(), || conn.dialect())
    }

    /// Return the cached dialect for `kind` or compute, store and return it.
    pub fn get_or_try_insert(
        &self,
        kind: ConnectionKind,
        compute: impl FnOnce() -> QsResult<Dialect>,
    ) -> QsResult<Dialect> {
        if let Some(d) = self.get(kind) {
            return Ok(d);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have filled the entry between the locks.
        if let Some(d) = entries.get(&kind) {
            return Ok(*d);
        }
        let dialect = compute()?;
        entries.insert(kind, dialect);

        #[cfg(feature = "tracing")]
        tracing::debug!(target: "qset", connection = kind.name(), %dialect, "resolved dialect");

        Ok(dialect)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
