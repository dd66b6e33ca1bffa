//! Synchronization results.
//!
//! Every admin event processed by the listener yields a [`SyncOutcome`].
//! Batches are summarized in a [`SyncReport`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Per-event outcome
// ============================================================================

/// Why an event left the role store untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    /// Not a realm or client role event.
    NotRoleEvent,
    /// Operation type other than create, update, or delete.
    UnsupportedOperation,
    /// The event's realm is unknown to the host.
    RealmNotFound,
    /// The resource path does not end in `roles/{name}`.
    UnparseablePath,
    /// The role no longer exists in the host model.
    RoleNotFound,
    /// The role store already holds the role.
    AlreadySynchronized,
    /// Nothing to delete.
    NotInStore,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NotRoleEvent => "not a role event",
            Self::UnsupportedOperation => "unsupported operation",
            Self::RealmNotFound => "realm not found",
            Self::UnparseablePath => "unparseable resource path",
            Self::RoleNotFound => "role not found in host model",
            Self::AlreadySynchronized => "already synchronized",
            Self::NotInStore => "role not in store",
        };
        f.write_str(reason)
    }
}

/// Result of processing one admin event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncOutcome {
    /// A role record was inserted.
    Created {
        /// External id of the new record.
        role_id: String,
    },
    /// A role record was overwritten.
    Updated {
        /// External id of the record.
        role_id: String,
    },
    /// A role record was removed.
    Deleted {
        /// External id of the removed record.
        role_id: String,
    },
    /// The event was ignored.
    Skipped {
        /// Why.
        reason: SkipReason,
    },
    /// Processing failed; the store was left as it was.
    Failed {
        /// Error message.
        message: String,
    },
}

impl SyncOutcome {
    /// Creates a skipped outcome.
    #[must_use]
    pub const fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }

    /// Returns true if the role store was changed.
    #[must_use]
    pub const fn is_change(&self) -> bool {
        matches!(
            self,
            Self::Created { .. } | Self::Updated { .. } | Self::Deleted { .. }
        )
    }

    /// Returns true if processing failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Short label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::Deleted { .. } => "deleted",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }
}

// ============================================================================
// Batch report
// ============================================================================

/// Summary of a batch of processed events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// Number of records inserted.
    pub created: usize,

    /// Number of records overwritten.
    pub updated: usize,

    /// Number of records removed.
    pub deleted: usize,

    /// Number of events ignored.
    pub skipped: usize,

    /// Number of events that failed.
    pub failed: usize,

    /// When processing started.
    pub started_at: DateTime<Utc>,

    /// When processing completed.
    pub completed_at: DateTime<Utc>,

    /// Status message.
    pub status: String,

    /// Failures encountered (if any).
    pub errors: Vec<SyncError>,
}

impl SyncReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            created: 0,
            updated: 0,
            deleted: 0,
            skipped: 0,
            failed: 0,
            started_at,
            completed_at: started_at,
            status: String::new(),
            errors: Vec::new(),
        }
    }

    /// Counts one outcome.
    pub fn record(&mut self, resource_path: &str, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Created { .. } => self.created += 1,
            SyncOutcome::Updated { .. } => self.updated += 1,
            SyncOutcome::Deleted { .. } => self.deleted += 1,
            SyncOutcome::Skipped { .. } => self.skipped += 1,
            SyncOutcome::Failed { message } => {
                self.failed += 1;
                self.errors.push(SyncError::new(resource_path, message.clone()));
            }
        }
    }

    /// Marks the batch as complete.
    #[must_use]
    pub fn complete(mut self) -> Self {
        self.completed_at = Utc::now();
        self.status = format!(
            "Sync completed: {} created, {} updated, {} deleted, {} skipped, {} failed",
            self.created, self.updated, self.deleted, self.skipped, self.failed
        );
        self
    }

    /// Returns the number of events counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.created + self.updated + self.deleted + self.skipped + self.failed
    }

    /// Returns true if any event failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A failed event in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncError {
    /// Resource path of the event.
    pub resource_path: String,
    /// Error message.
    pub message: String,
}

impl SyncError {
    /// Creates a new sync error.
    #[must_use]
    pub fn new(resource_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            resource_path: resource_path.into(),
            message: message.into(),
        }
    }
}
