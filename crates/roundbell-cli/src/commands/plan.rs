use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;

use super::load_plan;

#[derive(Subcommand)]
pub enum PlanAction {
    /// Print a plan with its computed totals
    Show {
        /// Plan file (.toml or .json); defaults to the built-in sample
        file: Option<PathBuf>,
    },
    /// List problems the session will work around
    Check {
        /// Plan file (.toml or .json); defaults to the built-in sample
        file: Option<PathBuf>,
    },
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PlanAction::Show { file } => {
            let plan = load_plan(file.as_deref())?;
            let overview = json!({
                "plan": &plan,
                "total_rounds": plan.total_rounds(),
                "warmup_secs": plan.warmup_secs(),
                "rounds_secs": plan.rounds_secs(),
                "cooldown_secs": plan.cooldown_secs(),
                "segment_secs": plan.segment_secs(),
                "estimated_total_secs": plan.estimated_total_secs(),
            });
            println!("{}", serde_json::to_string_pretty(&overview)?);
        }
        PlanAction::Check { file } => {
            let plan = load_plan(file.as_deref())?;
            let issues = plan.issues();
            println!("{}", serde_json::to_string_pretty(&issues)?);
            if !issues.is_empty() {
                eprintln!("{} issue(s) found", issues.len());
            }
        }
    }
    Ok(())
}
