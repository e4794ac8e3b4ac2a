use clap::Subcommand;
use roundbell_core::HistoryDb;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Most recent workouts as JSON
    List {
        /// Maximum number of workouts
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Totals across all recorded workouts
    Stats,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = HistoryDb::open()?;

    match action {
        HistoryAction::List { limit } => {
            let records = db.recent(limit)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        HistoryAction::Stats => {
            let stats = db.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
