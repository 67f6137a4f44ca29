use std::time::Duration;

use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use dayforge_core::ledger::SessionRecord;
use dayforge_core::storage::Database;
use dayforge_core::{
    BreathingConfig, Config, Event, PhasePlan, SessionEngine, SessionSlot, SessionSummary,
};

use super::plan::{load_or_generate, today};
use super::CliResult;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a study session for a plan block or an ad-hoc subject
    Study {
        /// ID of a study block in the day's plan
        #[arg(long, conflicts_with = "subject", required_unless_present = "subject")]
        block: Option<String>,
        /// Subject name for a session outside the plan
        #[arg(long)]
        subject: Option<String>,
        /// Plan day the block belongs to (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Override cycle count
        #[arg(long)]
        cycles: Option<u32>,
        /// Override work minutes per cycle
        #[arg(long)]
        work: Option<u32>,
        /// Override rest minutes per cycle
        #[arg(long)]
        rest: Option<u32>,
        #[command(flatten)]
        pace: Pace,
    },
    /// Run a guided breathing exercise
    Breathe {
        #[arg(long, default_value_t = 4)]
        inhale: u64,
        #[arg(long, default_value_t = 4)]
        hold_in: u64,
        #[arg(long, default_value_t = 4)]
        exhale: u64,
        #[arg(long, default_value_t = 4)]
        hold_out: u64,
        #[arg(long, default_value_t = 1)]
        rounds: u32,
        #[command(flatten)]
        pace: Pace,
    },
    /// List recorded sessions, newest first
    Log {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Args)]
pub struct Pace {
    /// Wall-clock milliseconds per session second (1000 = real time)
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,
}

impl Pace {
    fn period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

pub fn run(action: SessionAction) -> CliResult {
    let db = Database::open()?;
    let config = Config::load_or_default();

    match action {
        SessionAction::Study {
            block,
            subject,
            date,
            cycles,
            work,
            rest,
            pace,
        } => {
            let date = date.unwrap_or_else(today);
            let (block_id, subject, mut session_config) = match (block, subject) {
                (Some(id), _) => {
                    let plan = load_or_generate(&db, &config, date, None)?;
                    let activity = plan
                        .find(&id)
                        .ok_or_else(|| format!("no activity with id '{id}' in the plan for {date}"))?;
                    let session_config = activity
                        .session_config
                        .ok_or_else(|| format!("'{}' is not a study block", activity.title))?;
                    let subject = activity
                        .title
                        .strip_prefix("Study: ")
                        .unwrap_or(&activity.title)
                        .to_string();
                    (Some(id), subject, session_config)
                }
                (None, Some(name)) => (None, name, config.profile.session_config()),
                (None, None) => return Err("either --block or --subject is required".into()),
            };

            if let Some(n) = cycles {
                session_config.cycle_count = n;
            }
            if let Some(n) = work {
                session_config.work_minutes = n;
            }
            if let Some(n) = rest {
                session_config.rest_minutes = n;
            }

            let engine = SessionEngine::with_rewards(PhasePlan::study(&session_config)?, config.rewards);
            let slot_key = block_id.clone().unwrap_or_else(|| subject.clone());
            let summary = drive(&slot_key, engine, pace.period())?;
            let record = record_outcome(&db, &subject, &summary)?;

            if summary.completed_fully {
                if let Some(id) = block_id {
                    let mut plan = load_or_generate(&db, &config, date, None)?;
                    plan.mark_completed(&id)?;
                    db.save_plan(&plan)?;
                }
            }
            print_outcome(&summary, record.as_ref())?;
        }
        SessionAction::Breathe {
            inhale,
            hold_in,
            exhale,
            hold_out,
            rounds,
            pace,
        } => {
            let breathing = BreathingConfig {
                inhale_secs: inhale,
                hold_in_secs: hold_in,
                exhale_secs: exhale,
                hold_out_secs: hold_out,
                rounds,
            };
            let engine = SessionEngine::with_rewards(PhasePlan::breathing(&breathing)?, config.rewards);
            let summary = drive("breathing", engine, pace.period())?;
            let record = record_outcome(&db, "Breathing", &summary)?;
            print_outcome(&summary, record.as_ref())?;
        }
        SessionAction::Log { limit } => {
            let sessions = db.sessions(limit)?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
    }
    Ok(())
}

/// Run `engine` on a single-threaded runtime until it finishes.
fn drive(block_id: &str, engine: SessionEngine, period: Duration) -> CliResult<SessionSummary> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(tick_loop(block_id, engine, period))
}

/// Tick once per `period` until the session completes or Ctrl-C abandons it.
async fn tick_loop(block_id: &str, engine: SessionEngine, period: Duration) -> CliResult<SessionSummary> {
    let mut slot = SessionSlot::new();
    print_event(&slot.start(block_id, engine)?)?;

    let mut ticker = tokio::time::interval(period);
    // The first interval tick resolves immediately.
    ticker.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(event) = slot.tick()? {
                    print_event(&event)?;
                    if let Event::SessionCompleted { summary, .. } = event {
                        return Ok(summary);
                    }
                }
            }
            _ = &mut ctrl_c => {
                let engine = slot.engine_mut()?;
                print_event(&engine.snapshot())?;
                let summary = engine.abandon()?;
                eprintln!("session abandoned");
                return Ok(summary);
            }
        }
    }
}

fn record_outcome(db: &Database, subject: &str, summary: &SessionSummary) -> CliResult<Option<SessionRecord>> {
    Ok(db.settle_session(subject, summary, Utc::now())?)
}

fn print_event(event: &Event) -> CliResult {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn print_outcome(summary: &SessionSummary, record: Option<&SessionRecord>) -> CliResult {
    let out = serde_json::json!({
        "summary": summary,
        "recorded": record,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
