//! One active session per UI context.

use super::engine::{SessionEngine, SessionState};
use crate::error::SessionError;
use crate::events::Event;

/// The running session and the block it belongs to.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub block_id: String,
    pub engine: SessionEngine,
}

/// Holds at most one session. Starting a session for another block throws
/// the previous one away; its ticks simply stop being consumed.
#[derive(Debug, Default)]
pub struct SessionSlot {
    active: Option<ActiveSession>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, block_id: impl Into<String>, mut engine: SessionEngine) -> Result<Event, SessionError> {
        let block_id = block_id.into();
        if let Some(prev) = &self.active {
            let live = !prev.engine.state().is_terminal();
            if live && prev.block_id == block_id {
                return Err(SessionError::InvalidState {
                    action: "start",
                    state: prev.engine.state(),
                });
            }
            if live {
                tracing::info!(
                    previous = %prev.block_id,
                    next = %block_id,
                    "discarding unfinished session"
                );
            }
        }
        let event = engine.start()?;
        self.active = Some(ActiveSession { block_id, engine });
        Ok(event)
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn engine_mut(&mut self) -> Result<&mut SessionEngine, SessionError> {
        self.active
            .as_mut()
            .map(|a| &mut a.engine)
            .ok_or(SessionError::NoActiveSession)
    }

    pub fn tick(&mut self) -> Result<Option<Event>, SessionError> {
        self.engine_mut()?.tick()
    }

    /// Remove and return the held session, finished or not.
    pub fn take(&mut self) -> Option<ActiveSession> {
        self.active.take()
    }

    pub fn state(&self) -> Option<SessionState> {
        self.active.as_ref().map(|a| a.engine.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::SessionConfig;
    use crate::session::phases::PhasePlan;

    fn engine() -> SessionEngine {
        SessionEngine::new(PhasePlan::study(&SessionConfig::new(1, 1, 0)).unwrap())
    }

    #[test]
    fn empty_slot_reports_no_session() {
        let mut slot = SessionSlot::new();
        assert_eq!(slot.tick(), Err(SessionError::NoActiveSession));
        assert!(slot.state().is_none());
    }

    #[test]
    fn new_block_replaces_running_session() {
        let mut slot = SessionSlot::new();
        slot.start("math", engine()).unwrap();
        for _ in 0..10 {
            slot.tick().unwrap();
        }
        slot.start("physics", engine()).unwrap();
        let active = slot.active().unwrap();
        assert_eq!(active.block_id, "physics");
        assert_eq!(active.engine.total_focused_secs(), 0);
    }

    #[test]
    fn restarting_the_same_running_block_is_rejected() {
        let mut slot = SessionSlot::new();
        slot.start("math", engine()).unwrap();
        assert!(matches!(
            slot.start("math", engine()),
            Err(SessionError::InvalidState { action: "start", .. })
        ));
    }

    #[test]
    fn finished_block_can_be_restarted() {
        let mut slot = SessionSlot::new();
        slot.start("math", engine()).unwrap();
        for _ in 0..60 {
            slot.tick().unwrap();
        }
        assert_eq!(slot.state(), Some(SessionState::Completed));
        assert!(slot.start("math", engine()).is_ok());
        assert_eq!(slot.state(), Some(SessionState::Running));
    }
}
