//! Outstanding-identifier bookkeeping.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::point::Point;

/// Issues proposal identifiers and tracks which are still unresolved.
///
/// Identifiers start at 0 and increase by one per issue, so they are never
/// reused within a generator.
#[derive(Clone, Debug, Default)]
pub struct IdLedger {
    next_id: u64,
    outstanding: BTreeSet<u64>,
}

impl IdLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh identifier and marks it outstanding.
    pub fn issue(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.outstanding.insert(id);
        id
    }

    /// Returns `true` if `id` was issued and not yet resolved.
    #[must_use]
    pub fn is_outstanding(&self, id: u64) -> bool {
        self.outstanding.contains(&id)
    }

    /// Resolves `id`, returning whether it was outstanding.
    pub fn resolve(&mut self, id: u64) -> bool {
        self.outstanding.remove(&id)
    }

    /// Resolves the identifier of every point that carries one.
    pub fn resolve_batch(&mut self, points: &[Point]) {
        for id in points.iter().filter_map(Point::id) {
            self.outstanding.remove(&id);
        }
    }

    /// Outstanding identifiers in ascending order.
    #[must_use]
    pub fn outstanding(&self) -> Vec<u64> {
        self.outstanding.iter().copied().collect()
    }

    #[must_use]
    pub fn n_outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Number of identifiers issued so far.
    #[must_use]
    pub fn n_issued(&self) -> u64 {
        self.next_id
    }

    /// Checks that every identifier in `points` is outstanding and appears
    /// at most once in the batch. Points without [`ID_KEY`](crate::ID_KEY)
    /// are exempt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownIdentifier`] listing every offending position.
    pub fn check_batch(&self, points: &[Point]) -> Result<()> {
        let mut seen = BTreeSet::new();
        let indices: Vec<usize> = points
            .iter()
            .enumerate()
            .filter(|(_, point)| point.has_id_key())
            .filter(|(_, point)| match point.id() {
                Some(id) => !self.is_outstanding(id) || !seen.insert(id),
                None => true,
            })
            .map(|(index, _)| index)
            .collect();

        if indices.is_empty() {
            Ok(())
        } else {
            Err(Error::UnknownIdentifier { indices })
        }
    }
}
