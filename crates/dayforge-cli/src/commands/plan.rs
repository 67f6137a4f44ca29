use chrono::{Local, NaiveDate};
use clap::Subcommand;
use dayforge_core::storage::Database;
use dayforge_core::{Config, DailyPlan, Event, PlanCache, SeededFillers};

use super::CliResult;

#[derive(Subcommand)]
pub enum PlanAction {
    /// Show the plan for a day (generated on first use, then cached)
    Show {
        /// Day to show, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Regenerate with this filler seed, replacing the cached plan
        #[arg(long)]
        seed: Option<u64>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the morning digest
    Summary {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Mark an activity as done
    Complete {
        /// Activity ID
        id: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The stored plan for `date`, generating and storing one if none exists.
/// An explicit `seed` always regenerates.
pub(crate) fn load_or_generate(
    db: &Database,
    config: &Config,
    date: NaiveDate,
    seed: Option<u64>,
) -> CliResult<DailyPlan> {
    let stored = match seed {
        Some(_) => None,
        None => db.load_plan(date)?,
    };
    let mut cache = stored.map(PlanCache::with_plan).unwrap_or_default();
    let fresh = cache.plan().is_none();

    let mut fillers = match seed {
        Some(seed) => SeededFillers::new(seed),
        None => SeededFillers::for_date(date),
    };
    let plan = cache
        .get_or_generate(date, &config.generator(), &config.profile, &mut fillers)
        .clone();

    if fresh {
        db.save_plan(&plan)?;
        let event = serde_json::to_string(&Event::plan_generated(&plan))?;
        tracing::info!(%event, "plan generated");
    }
    Ok(plan)
}

fn print_plan(plan: &DailyPlan) {
    println!("Plan for {} ({:.0}% done)", plan.date, plan.progress_pct());
    for a in &plan.activities {
        let mark = if a.is_completed { "x" } else { " " };
        println!(
            "{}-{}  [{mark}] {} {}  {}",
            a.start_time,
            a.end_time,
            a.kind.icon(),
            a.title,
            a.id
        );
    }
}

pub fn run(action: PlanAction) -> CliResult {
    let db = Database::open()?;
    let config = Config::load_or_default();

    match action {
        PlanAction::Show { date, seed, json } => {
            let plan = load_or_generate(&db, &config, date.unwrap_or_else(today), seed)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_plan(&plan);
            }
        }
        PlanAction::Summary { date } => {
            let plan = load_or_generate(&db, &config, date.unwrap_or_else(today), None)?;
            println!("{}", plan.morning_summary());
        }
        PlanAction::Complete { id, date } => {
            let mut plan = load_or_generate(&db, &config, date.unwrap_or_else(today), None)?;
            plan.mark_completed(&id)?;
            db.save_plan(&plan)?;
            println!("completed ({:.0}% of the day done)", plan.progress_pct());
        }
    }
    Ok(())
}
