//! SQLite-based session log, reward ledger and statistics.
//!
//! Provides persistent storage for:
//! - Finished (or partially credited) study and breathing sessions
//! - Every reward handed out, with its reason
//! - Key-value store for application state (cached plans)

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{CoreError, DatabaseError, Result};
use crate::ledger::{settle, Ledger, SessionRecord, SessionStore};
use crate::planner::DailyPlan;
use crate::session::{Reward, SessionSummary};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub total_cycles: u64,
    pub today_sessions: u64,
    pub totals: LedgerTotals,
    pub today_xp: u64,
}

/// Sums over the reward ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LedgerTotals {
    pub xp: u64,
    pub wellness_minutes: u64,
}

/// SQLite database for sessions and rewards.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/dayforge/dayforge.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("dayforge.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS sessions (
                    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
                    subject_name       TEXT NOT NULL,
                    cycles_completed   INTEGER NOT NULL,
                    completed_date     TEXT NOT NULL,
                    is_fully_completed INTEGER NOT NULL,
                    xp_earned          INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS ledger (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    kind       TEXT NOT NULL,
                    amount     INTEGER NOT NULL,
                    reason     TEXT NOT NULL DEFAULT '',
                    awarded_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_sessions_completed_date ON sessions(completed_date);
                CREATE INDEX IF NOT EXISTS idx_ledger_awarded_at ON ledger(awarded_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Most recent sessions first.
    pub fn sessions(&self, limit: usize) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT subject_name, cycles_completed, completed_date, is_fully_completed, xp_earned
             FROM sessions
             ORDER BY completed_date DESC, id DESC
             LIMIT ?1",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit], |row| {
            Ok(SessionRecord {
                subject_name: row.get(0)?,
                cycles_completed: row.get(1)?,
                completed_date: parse_timestamp(2, &row.get::<_, String>(2)?)?,
                is_fully_completed: row.get(3)?,
                xp_earned: row.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn ledger_totals(&self) -> Result<LedgerTotals> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, COALESCE(SUM(amount), 0) FROM ledger GROUP BY kind",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?)))?;

        let mut totals = LedgerTotals::default();
        for row in rows {
            let (kind, amount) = row?;
            match kind.as_str() {
                "xp" => totals.xp += amount,
                "wellness_minutes" => totals.wellness_minutes += amount,
                _ => {}
            }
        }
        Ok(totals)
    }

    pub fn stats(&self) -> Result<Stats> {
        self.stats_on(Utc::now().date_naive())
    }

    /// Statistics with "today" pinned to `today` (UTC).
    pub fn stats_on(&self, today: NaiveDate) -> Result<Stats> {
        let day_start = day_start_rfc3339(today);
        let next_day_start = match today.succ_opt() {
            Some(next) => day_start_rfc3339(next),
            None => "~".to_string(),
        };
        let mut stats = Stats {
            totals: self.ledger_totals()?,
            ..Stats::default()
        };

        let (total, completed, cycles) = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(is_fully_completed), 0),
                    COALESCE(SUM(cycles_completed), 0)
             FROM sessions",
            [],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?, row.get::<_, u64>(2)?)),
        )?;
        stats.total_sessions = total;
        stats.completed_sessions = completed;
        stats.total_cycles = cycles;

        stats.today_sessions = self.conn.query_row(
            "SELECT COUNT(*) FROM sessions WHERE completed_date >= ?1 AND completed_date < ?2",
            params![day_start, next_day_start],
            |row| row.get(0),
        )?;
        stats.today_xp = self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM ledger
             WHERE kind = 'xp' AND awarded_at >= ?1 AND awarded_at < ?2",
            params![day_start, next_day_start],
            |row| row.get(0),
        )?;

        Ok(stats)
    }

    /// Record and reward a finished session in one transaction.
    ///
    /// Either both the session row and its ledger entry land, or neither does.
    pub fn settle_session(
        &self,
        subject_name: &str,
        summary: &SessionSummary,
        at: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>> {
        let tx = self.conn.unchecked_transaction()?;
        let (mut ledger, mut store) = (self, self);
        let record = settle(subject_name, summary, at, &mut ledger, &mut store)?;
        tx.commit()?;
        Ok(record)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Cache a plan so completion marks survive between runs.
    pub fn save_plan(&self, plan: &DailyPlan) -> Result<()> {
        let json = serde_json::to_string(plan)?;
        self.kv_set(&plan_key(plan.date), &json)
    }

    pub fn load_plan(&self, date: NaiveDate) -> Result<Option<DailyPlan>> {
        match self.kv_get(&plan_key(date))? {
            Some(json) => Ok(Some(serde_json::from_str(&json).map_err(CoreError::Json)?)),
            None => Ok(None),
        }
    }
}

// Both traits are implemented on `&Database`, so one connection can serve as
// ledger and session store within the same `settle` call.
impl Ledger for &Database {
    fn award(&mut self, reward: Reward, reason: &str) -> Result<()> {
        let (kind, amount) = match reward {
            Reward::Xp(n) => ("xp", n),
            Reward::WellnessMinutes(n) => ("wellness_minutes", n),
        };
        self.conn.execute(
            "INSERT INTO ledger (kind, amount, reason, awarded_at) VALUES (?1, ?2, ?3, ?4)",
            params![kind, amount, reason, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

impl SessionStore for &Database {
    fn append(&mut self, record: &SessionRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions (subject_name, cycles_completed, completed_date, is_fully_completed, xp_earned)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.subject_name,
                record.cycles_completed,
                record.completed_date.to_rfc3339(),
                record.is_fully_completed,
                record.xp_earned,
            ],
        )?;
        Ok(())
    }
}

/// Timestamps are stored as UTC RFC 3339, so day bounds compare as text.
fn day_start_rfc3339(date: NaiveDate) -> String {
    format!("{}T00:00:00+00:00", date.format("%Y-%m-%d"))
}

fn plan_key(date: NaiveDate) -> String {
    format!("plan:{}", date.format("%Y-%m-%d"))
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::activity::Activity;
    use crate::clock::ClockTime;

    fn record(subject: &str, full: bool, xp: u32) -> SessionRecord {
        SessionRecord {
            subject_name: subject.to_string(),
            cycles_completed: if full { 2 } else { 0 },
            completed_date: Utc::now(),
            is_fully_completed: full,
            xp_earned: xp,
        }
    }

    #[test]
    fn record_and_query() {
        let db = Database::open_memory().unwrap();
        let mut store = &db;
        store.append(&record("Math", true, 100)).unwrap();
        store.append(&record("Physics", false, 4)).unwrap();

        let sessions = db.sessions(10).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].subject_name, "Physics");

        let stats = db.stats().unwrap();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.completed_sessions, 1);
        assert_eq!(stats.total_cycles, 2);
        assert_eq!(stats.today_sessions, 2);
    }

    #[test]
    fn ledger_sums_by_kind() {
        let db = Database::open_memory().unwrap();
        let mut ledger = &db;
        ledger.award(Reward::Xp(100), "Completed session: Math").unwrap();
        ledger.award(Reward::Xp(6), "Partial session: Art").unwrap();
        ledger.award(Reward::WellnessMinutes(2), "Completed session: Breathing").unwrap();

        let totals = db.ledger_totals().unwrap();
        assert_eq!(totals, LedgerTotals { xp: 106, wellness_minutes: 2 });
        assert_eq!(db.stats().unwrap().today_xp, 106);
    }

    #[test]
    fn stats_on_counts_only_that_day() {
        let db = Database::open_memory().unwrap();
        let mut store = &db;
        for (day, hour) in [(1, 23), (2, 9), (2, 23), (3, 0)] {
            store
                .append(&SessionRecord {
                    completed_date: Utc.with_ymd_and_hms(2026, 3, day, hour, 30, 0).unwrap(),
                    ..record("Math", true, 10)
                })
                .unwrap();
            db.conn
                .execute(
                    "INSERT INTO ledger (kind, amount, reason, awarded_at) VALUES ('xp', 10, '', ?1)",
                    params![Utc.with_ymd_and_hms(2026, 3, day, hour, 30, 0).unwrap().to_rfc3339()],
                )
                .unwrap();
        }

        let stats = db.stats_on(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()).unwrap();
        assert_eq!(stats.total_sessions, 4);
        assert_eq!(stats.today_sessions, 2);
        assert_eq!(stats.today_xp, 20);
        assert_eq!(stats.totals.xp, 40);

        let earlier = db.stats_on(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()).unwrap();
        assert_eq!((earlier.today_sessions, earlier.today_xp), (0, 0));
    }

    #[test]
    fn failed_award_rolls_back_the_session_row() {
        let db = Database::open_memory().unwrap();
        db.conn.execute_batch("DROP TABLE ledger").unwrap();
        let summary = SessionSummary {
            mode: crate::session::SessionMode::Study,
            cycles_completed: 2,
            total_work_minutes: 50,
            total_focused_secs: 3000,
            elapsed_secs: 3600,
            reward: Reward::Xp(100),
            completed_fully: true,
        };

        assert!(db.settle_session("Math", &summary, Utc::now()).is_err());
        assert!(db.sessions(10).unwrap().is_empty());

        db.migrate().unwrap();
        let record = db.settle_session("Math", &summary, Utc::now()).unwrap().unwrap();
        assert_eq!(record.xp_earned, 100);
        assert_eq!(db.sessions(10).unwrap().len(), 1);
        assert_eq!(db.ledger_totals().unwrap().xp, 100);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn plan_cache_roundtrip() {
        let db = Database::open_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert!(db.load_plan(date).unwrap().is_none());

        let mut plan = DailyPlan::new(
            date,
            vec![Activity::study("Math", ClockTime::new(15, 30), ClockTime::new(16, 30), Default::default())],
        );
        let id = plan.activities[0].id.clone();
        plan.mark_completed(&id).unwrap();
        db.save_plan(&plan).unwrap();

        assert_eq!(db.load_plan(date).unwrap(), Some(plan));
    }
}
