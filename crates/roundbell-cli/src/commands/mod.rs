pub mod config;
pub mod history;
pub mod plan;
pub mod session;

mod console;

use std::path::Path;

use roundbell_core::WorkoutPlan;

/// Load `file`, or the built-in sample plan when none is given.
fn load_plan(file: Option<&Path>) -> Result<WorkoutPlan, Box<dyn std::error::Error>> {
    let plan = match file {
        Some(path) => WorkoutPlan::load(path)?,
        None => WorkoutPlan::sample_boxing(),
    };
    tracing::debug!("Loaded plan '{}' with {} rounds", plan.title, plan.total_rounds());
    Ok(plan)
}
