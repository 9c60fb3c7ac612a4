//! Destination for finished packs.

use dd_core::{Pack, PackId};
use thiserror::Error;

/// Failure to persist a finished pack. Logged by the lifecycle, never
/// propagated into its state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("archive unavailable: {0}")]
    Unavailable(String),

    #[error("archive rejected {pack}: {reason}")]
    Rejected { pack: PackId, reason: String },
}

/// Receives each pack once all of its cards are revealed.
pub trait PackSink {
    fn archive(&mut self, pack: &Pack) -> Result<(), ArchiveError>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PackSink for NullSink {
    fn archive(&mut self, _pack: &Pack) -> Result<(), ArchiveError> {
        Ok(())
    }
}

/// Keeps finished packs in memory, optionally up to a limit.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    packs: Vec<Pack>,
    limit: Option<usize>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Archive that refuses packs once it holds `limit` of them.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            packs: Vec::new(),
            limit: Some(limit),
        }
    }

    pub fn packs(&self) -> &[Pack] {
        &self.packs
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}

impl PackSink for MemoryArchive {
    fn archive(&mut self, pack: &Pack) -> Result<(), ArchiveError> {
        if let Some(limit) = self.limit {
            if self.packs.len() >= limit {
                return Err(ArchiveError::Unavailable(format!(
                    "archive is full ({limit} packs)"
                )));
            }
        }
        if self.packs.iter().any(|p| p.id() == pack.id()) {
            return Err(ArchiveError::Rejected {
                pack: pack.id(),
                reason: "already archived".to_string(),
            });
        }
        self.packs.push(pack.clone());
        Ok(())
    }
}
