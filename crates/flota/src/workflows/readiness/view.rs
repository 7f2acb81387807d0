use std::fmt;
use std::hash::Hash;

use serde::Serialize;

use super::aggregator::{EntityKind, ExpiryMap, ExpirySummary};

/// Loading state of a list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ListPhase {
    Idle,
    Loading,
    Loaded,
    LoadError(String),
}

/// Secondary expiry check that runs once per successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryCheck {
    NotStarted,
    InFlight,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} while the view is {phase:?} / {check:?}")]
pub struct ViewTransitionError {
    pub action: &'static str,
    pub phase: ListPhase,
    pub check: ExpiryCheck,
}

/// Rows that can be looked up in an expiry map.
pub trait Keyed {
    type Key: Eq + Hash + Clone + fmt::Debug + fmt::Display + Serialize;

    fn key(&self) -> Self::Key;
}

/// View state for one list screen: rows, per-row expiry flags and the summary banner.
///
/// Derived state is always replaced wholesale; a reload resets both state machines.
#[derive(Debug, Clone, Serialize)]
pub struct ListView<R: Keyed> {
    kind: EntityKind,
    phase: ListPhase,
    check: ExpiryCheck,
    rows: Vec<R>,
    expiry: ExpiryMap<R::Key>,
    summary: ExpirySummary,
}

impl<R: Keyed> ListView<R> {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            phase: ListPhase::Idle,
            check: ExpiryCheck::NotStarted,
            rows: Vec::new(),
            expiry: ExpiryMap::default(),
            summary: ExpirySummary::cleared(),
        }
    }

    pub fn phase(&self) -> &ListPhase {
        &self.phase
    }

    pub fn check(&self) -> ExpiryCheck {
        self.check
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn expiry(&self) -> &ExpiryMap<R::Key> {
        &self.expiry
    }

    pub fn summary(&self) -> &ExpirySummary {
        &self.summary
    }

    pub fn has_expired(&self, key: &R::Key) -> bool {
        self.expiry.has_expired(key)
    }

    /// Start (or restart) a load. Previously derived flags stay visible until replaced.
    pub fn begin_load(&mut self) {
        self.phase = ListPhase::Loading;
        self.check = ExpiryCheck::NotStarted;
    }

    pub fn finish_load(&mut self, rows: Vec<R>) -> Result<(), ViewTransitionError> {
        self.expect_phase("finish loading", &ListPhase::Loading)?;
        self.rows = rows;
        self.phase = ListPhase::Loaded;
        Ok(())
    }

    /// The listing itself failed: nothing to check, so derived state is cleared.
    pub fn fail_load(&mut self, message: impl Into<String>) -> Result<(), ViewTransitionError> {
        self.expect_phase("fail loading", &ListPhase::Loading)?;
        self.phase = ListPhase::LoadError(message.into());
        self.rows.clear();
        self.expiry = ExpiryMap::default();
        self.summary = ExpirySummary::cleared();
        Ok(())
    }

    /// Mark the expiry check as started and return the keys to check.
    ///
    /// With no rows the check completes immediately with an empty map and a cleared banner.
    pub fn begin_expiry_check(&mut self) -> Result<Vec<R::Key>, ViewTransitionError> {
        self.expect_phase("start the expiry check", &ListPhase::Loaded)?;
        if self.check != ExpiryCheck::NotStarted {
            return Err(self.transition_error("start the expiry check"));
        }

        if self.rows.is_empty() {
            self.expiry = ExpiryMap::default();
            self.summary = ExpirySummary::cleared();
            self.check = ExpiryCheck::Done;
            return Ok(Vec::new());
        }

        self.check = ExpiryCheck::InFlight;
        Ok(self.rows.iter().map(Keyed::key).collect())
    }

    /// Apply a finished aggregation. Results are applied to whichever load is current
    /// (last write wins); there is no cancellation of superseded checks.
    pub fn finish_expiry_check(
        &mut self,
        expiry: ExpiryMap<R::Key>,
    ) -> Result<(), ViewTransitionError> {
        self.expect_phase("finish the expiry check", &ListPhase::Loaded)?;
        self.summary = ExpirySummary::from_map(self.kind, &expiry);
        self.expiry = expiry;
        self.check = ExpiryCheck::Done;
        Ok(())
    }

    fn expect_phase(
        &self,
        action: &'static str,
        expected: &ListPhase,
    ) -> Result<(), ViewTransitionError> {
        if &self.phase == expected {
            Ok(())
        } else {
            Err(self.transition_error(action))
        }
    }

    fn transition_error(&self, action: &'static str) -> ViewTransitionError {
        ViewTransitionError {
            action,
            phase: self.phase.clone(),
            check: self.check,
        }
    }
}
