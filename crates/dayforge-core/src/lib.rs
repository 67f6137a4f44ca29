//! # Dayforge Core Library
//!
//! This library provides the core logic for Dayforge, a daily planner for
//! students. All operations are available through the standalone CLI binary,
//! which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Planner**: Builds one day of non-overlapping activities from a
//!   profile (institution hours, meals, optional tuition, study subjects),
//!   then fills every remaining gap with a size-appropriate filler
//! - **Session Engine**: A tick-driven countdown state machine for study
//!   cycles and breathing exercises, producing a reward summary
//! - **Ledger**: Traits through which finished sessions award rewards and
//!   are recorded
//! - **Storage**: SQLite-based session/reward storage and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`DailyPlanGenerator`]: Pure plan generation
//! - [`SessionEngine`]: Core countdown state machine
//! - [`Database`]: Session, ledger and plan persistence
//! - [`Config`]: Application configuration management

pub mod activity;
pub mod clock;
pub mod error;
pub mod events;
pub mod ledger;
pub mod planner;
pub mod session;
pub mod storage;

pub use activity::{Activity, ActivityKind, InstitutionKind, SessionConfig};
pub use clock::ClockTime;
pub use error::{ConfigError, CoreError, DatabaseError, SessionError, ValidationError};
pub use events::Event;
pub use ledger::{settle, Ledger, SessionRecord, SessionStore};
pub use planner::{
    DailyPlan, DailyPlanGenerator, FillerSource, GapBucket, PlanCache, PlannerSettings,
    ProfileConfig, SeededFillers, ShortGapPolicy,
};
pub use session::{
    BreathingConfig, PhaseKind, PhasePlan, Reward, RewardPolicy, SessionEngine, SessionMode,
    SessionSlot, SessionState, SessionSummary,
};
pub use storage::{Config, Database, Stats};
