use clap::Args;
use studyplan_core::{Config, PlanOutcome};

use super::{open_service, CliResult};

#[derive(Args)]
pub struct PlanArgs {
    /// Task ID
    pub id: String,
    /// Use the cram daily cap (360 minutes)
    #[arg(long, conflicts_with = "normal")]
    pub cram: bool,
    /// Use the normal daily cap (240 minutes) even if cram is configured
    #[arg(long)]
    pub normal: bool,
}

pub fn run(args: PlanArgs) -> CliResult {
    let config = Config::load_or_default();
    let cram = if args.cram {
        true
    } else if args.normal {
        false
    } else {
        config.planner.cram
    };

    let service = open_service()?;
    let planned = service.plan(&args.id, cram)?;
    if let PlanOutcome::PartiallyScheduled { shortfall_minutes } = planned.outcome {
        eprintln!("warning: {shortfall_minutes} minutes could not be scheduled before the deadline");
    }
    println!("{}", serde_json::to_string_pretty(&planned)?);
    Ok(())
}
