mod engine;
mod phases;
mod slot;
mod summary;

pub use engine::{run_to_completion, SessionEngine, SessionState};
pub use phases::{BreathingConfig, Phase, PhaseKind, PhasePlan, SessionMode};
pub use slot::{ActiveSession, SessionSlot};
pub use summary::{Reward, RewardPolicy, SessionSummary};
