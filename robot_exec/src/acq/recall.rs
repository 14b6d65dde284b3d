//! # Recall
//!
//! Manoeuvres which finish with a meaningful measurement (a heading, a range) record it in a
//! [`RecallRecord`] so that later manoeuvres can reuse it, for example to turn back to where an
//! earlier rotation started from. Records are tagged with the kind of manoeuvre that produced
//! them so a consumer can't mistake a range for a heading.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;

use log::trace;
use serde::Serialize;
use thiserror::Error;

use comms_if::tc::acq::RecallMethod;

use crate::mnvr_mgr::MnvrId;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A manoeuvre which captures a terminal value.
pub trait Recallable {
    /// The record held by this manoeuvre.
    fn recall_record(&self) -> &RecallRecord;

    /// The captured value, or `None` if the manoeuvre hasn't finished.
    fn recall(&self) -> Option<f64> {
        self.recall_record().value()
    }

    fn kind(&self) -> ManeuverKind {
        self.recall_record().kind()
    }
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Terminal value of a manoeuvre, tagged by the manoeuvre's kind.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct RecallRecord {
    kind: ManeuverKind,
    value: Option<f64>,
}

/// Records of finished manoeuvres, indexed by the manoeuvre's ID.
///
/// IDs are allocated in start order, so the highest ID of a kind is the most recent.
#[derive(Debug, Default)]
pub struct RecallRegistry {
    records: BTreeMap<MnvrId, RecallRecord>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The kind of value a manoeuvre captures.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ManeuverKind {
    /// An absolute heading in degrees
    Rotation,

    /// A range in inches
    Distance,
}

#[derive(Debug, Error, PartialEq)]
pub enum RecallError {
    #[error("No recall value is available")]
    NotAvailable,

    #[error("Expected a {expected:?} recall value but found a {found:?} one")]
    KindMismatch {
        expected: ManeuverKind,
        found: ManeuverKind,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RecallRecord {
    /// Create an empty record.
    pub fn new(kind: ManeuverKind) -> Self {
        Self { kind, value: None }
    }

    /// Capture the terminal value. Only the first capture is kept.
    pub fn capture(&mut self, value: f64) {
        if self.value.is_none() {
            self.value = Some(value);
        }
    }

    pub fn kind(&self) -> ManeuverKind {
        self.kind
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn is_available(&self) -> bool {
        self.value.is_some()
    }

    /// Get the value of this record for reuse with the given method.
    ///
    /// Fails if the record is of a different kind to `expected`, or if nothing was captured.
    pub fn apply(&self, expected: ManeuverKind, method: RecallMethod) -> Result<f64, RecallError> {
        if self.kind != expected {
            return Err(RecallError::KindMismatch {
                expected,
                found: self.kind,
            });
        }

        let value = self.value.ok_or(RecallError::NotAvailable)?;

        Ok(match method {
            RecallMethod::Repeat => value,
            RecallMethod::Reverse => -value,
        })
    }
}

impl RecallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the record of a finished manoeuvre, replacing any previous record with this ID.
    pub fn insert(&mut self, id: MnvrId, record: RecallRecord) {
        trace!("Recall record for {}: {:?}", id, record);

        self.records.insert(id, record);
    }

    pub fn get(&self, id: MnvrId) -> Option<&RecallRecord> {
        self.records.get(&id)
    }

    /// Drop the record of a manoeuvre, returning it if there was one.
    pub fn remove(&mut self, id: MnvrId) -> Option<RecallRecord> {
        self.records.remove(&id)
    }

    /// The most recent record of the given kind which holds a value.
    pub fn latest(&self, kind: ManeuverKind) -> Option<(MnvrId, &RecallRecord)> {
        self.records
            .iter()
            .rev()
            .find(|(_, r)| r.kind() == kind && r.is_available())
            .map(|(i, r)| (*i, r))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
