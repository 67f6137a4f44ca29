use serde::{Deserialize, Serialize};

use super::phases::SessionMode;

/// What a finished session earns, and for which ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum Reward {
    Xp(u32),
    WellnessMinutes(u32),
}

impl Reward {
    pub fn amount(self) -> u32 {
        match self {
            Reward::Xp(n) | Reward::WellnessMinutes(n) => n,
        }
    }
}

/// XP rates. Lives under `[rewards]` in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPolicy {
    #[serde(default = "default_xp_per_minute")]
    pub xp_per_minute: u32,
}

fn default_xp_per_minute() -> u32 {
    2
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            xp_per_minute: default_xp_per_minute(),
        }
    }
}

impl RewardPolicy {
    /// XP for a session that ran to completion.
    pub fn full(&self, work_minutes: u32) -> u32 {
        work_minutes.saturating_mul(self.xp_per_minute)
    }

    /// XP for an abandoned session: whole focused minutes, nothing for the
    /// first minute or less.
    pub fn partial(&self, focused_secs: u64) -> u32 {
        if focused_secs > 60 {
            let minutes = u32::try_from(focused_secs / 60).unwrap_or(u32::MAX);
            minutes.saturating_mul(self.xp_per_minute)
        } else {
            0
        }
    }
}

/// Terminal report handed to the ledger and the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub mode: SessionMode,
    pub cycles_completed: u32,
    pub total_work_minutes: u32,
    pub total_focused_secs: u64,
    pub elapsed_secs: u64,
    pub reward: Reward,
    pub completed_fully: bool,
}

impl SessionSummary {
    pub fn xp(&self) -> u32 {
        match self.reward {
            Reward::Xp(n) => n,
            Reward::WellnessMinutes(_) => 0,
        }
    }

    /// Whether this outcome should be recorded at all.
    pub fn is_worth_recording(&self) -> bool {
        self.completed_fully || self.reward.amount() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_credit_boundary() {
        let policy = RewardPolicy::default();
        assert_eq!(policy.partial(0), 0);
        assert_eq!(policy.partial(60), 0);
        assert_eq!(policy.partial(61), 2);
        assert_eq!(policy.partial(119), 2);
        assert_eq!(policy.partial(120), 4);
    }

    #[test]
    fn full_reward_scales_with_minutes() {
        let policy = RewardPolicy { xp_per_minute: 3 };
        assert_eq!(policy.full(50), 150);
    }

    #[test]
    fn reward_serializes_with_kind_and_amount() {
        let json = serde_json::to_string(&Reward::WellnessMinutes(3)).unwrap();
        assert_eq!(json, r#"{"kind":"wellness_minutes","amount":3}"#);
    }
}
