//! Seams to the gamification ledger and the session log.
//!
//! The engine only computes reward amounts. Awarding them and recording the
//! session happen here, behind traits, so the core never touches ledger
//! state directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::{Reward, SessionSummary};

/// Receives reward amounts.
pub trait Ledger {
    fn award(&mut self, reward: Reward, reason: &str) -> Result<()>;
}

/// Append-only log of finished sessions.
pub trait SessionStore {
    fn append(&mut self, record: &SessionRecord) -> Result<()>;
}

/// Immutable record of one finished (or partially credited) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub subject_name: String,
    pub cycles_completed: u32,
    pub completed_date: DateTime<Utc>,
    pub is_fully_completed: bool,
    pub xp_earned: u32,
}

impl SessionRecord {
    /// `None` when the session neither completed nor earned anything.
    pub fn from_summary(subject_name: &str, summary: &SessionSummary, at: DateTime<Utc>) -> Option<Self> {
        if !summary.is_worth_recording() {
            return None;
        }
        Some(Self {
            subject_name: subject_name.to_string(),
            cycles_completed: summary.cycles_completed,
            completed_date: at,
            is_fully_completed: summary.completed_fully,
            xp_earned: summary.xp(),
        })
    }
}

/// Hand a terminal summary to both collaborators.
///
/// The session is recorded before anything is awarded, so a failing store
/// never leaves an unexplained reward behind. `Database::settle_session`
/// additionally makes the pair atomic.
///
/// Returns the stored record, if the session was worth one.
pub fn settle(
    subject_name: &str,
    summary: &SessionSummary,
    at: DateTime<Utc>,
    ledger: &mut dyn Ledger,
    store: &mut dyn SessionStore,
) -> Result<Option<SessionRecord>> {
    let record = SessionRecord::from_summary(subject_name, summary, at);
    if let Some(record) = &record {
        store.append(record)?;
        tracing::debug!(subject = subject_name, xp = record.xp_earned, "session recorded");
    }

    if summary.reward.amount() > 0 {
        let reason = if summary.completed_fully {
            format!("Completed session: {subject_name}")
        } else {
            format!("Partial session: {subject_name}")
        };
        ledger.award(summary.reward, &reason)?;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionMode;

    #[derive(Default)]
    struct MemLedger(Vec<(Reward, String)>);

    impl Ledger for MemLedger {
        fn award(&mut self, reward: Reward, reason: &str) -> Result<()> {
            self.0.push((reward, reason.to_string()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemStore(Vec<SessionRecord>);

    impl SessionStore for MemStore {
        fn append(&mut self, record: &SessionRecord) -> Result<()> {
            self.0.push(record.clone());
            Ok(())
        }
    }

    fn summary(reward: Reward, completed_fully: bool) -> SessionSummary {
        SessionSummary {
            mode: SessionMode::Study,
            cycles_completed: if completed_fully { 2 } else { 0 },
            total_work_minutes: 50,
            total_focused_secs: 3000,
            elapsed_secs: 3600,
            reward,
            completed_fully,
        }
    }

    #[test]
    fn completed_session_is_awarded_and_recorded() {
        let (mut ledger, mut store) = (MemLedger::default(), MemStore::default());
        let record = settle("Math", &summary(Reward::Xp(100), true), Utc::now(), &mut ledger, &mut store)
            .unwrap()
            .unwrap();
        assert_eq!(record.xp_earned, 100);
        assert!(record.is_fully_completed);
        assert_eq!(ledger.0, vec![(Reward::Xp(100), "Completed session: Math".to_string())]);
        assert_eq!(store.0.len(), 1);
    }

    #[test]
    fn worthless_abandon_touches_nothing() {
        let (mut ledger, mut store) = (MemLedger::default(), MemStore::default());
        let record = settle("Math", &summary(Reward::Xp(0), false), Utc::now(), &mut ledger, &mut store).unwrap();
        assert!(record.is_none());
        assert!(ledger.0.is_empty());
        assert!(store.0.is_empty());
    }

    struct BrokenStore;

    impl SessionStore for BrokenStore {
        fn append(&mut self, _record: &SessionRecord) -> Result<()> {
            Err(crate::error::DatabaseError::QueryFailed("disk full".into()).into())
        }
    }

    #[test]
    fn failed_append_awards_nothing() {
        let mut ledger = MemLedger::default();
        let result = settle("Math", &summary(Reward::Xp(100), true), Utc::now(), &mut ledger, &mut BrokenStore);
        assert!(result.is_err());
        assert!(ledger.0.is_empty());
    }

    #[test]
    fn partial_credit_is_recorded_as_partial() {
        let (mut ledger, mut store) = (MemLedger::default(), MemStore::default());
        settle("Physics", &summary(Reward::Xp(4), false), Utc::now(), &mut ledger, &mut store).unwrap();
        assert_eq!(ledger.0[0].1, "Partial session: Physics");
        assert!(!store.0[0].is_fully_completed);
    }
}
