use dayforge_core::storage::Database;

use super::CliResult;

pub fn run() -> CliResult {
    let db = Database::open()?;
    let stats = db.stats()?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
