use std::time::Duration;

use chrono::{Local, NaiveDate, Utc};
use clap::Args;
use studyplan_core::digest::digest_for;
use studyplan_core::{Config, TaskDb, TaskFilter, TaskStore};

use super::CliResult;

#[derive(Args)]
pub struct DigestArgs {
    /// Local date to report on (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Stay running and print one digest per day at the configured hour
    #[arg(long, conflicts_with = "date")]
    pub watch: bool,
}

pub fn run(args: DigestArgs) -> CliResult {
    let db = TaskDb::open()?;

    if args.watch {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        return runtime.block_on(watch(db));
    }

    let date = args
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&Local).date_naive());
    let tasks = db.list(&TaskFilter::default())?;
    let event = digest_for(date, &Local, &tasks);
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}

async fn watch(db: TaskDb) -> CliResult {
    let config = Config::load_or_default();
    if !config.digest.enabled {
        return Err("digest is disabled (digest.enabled = false)".into());
    }
    let mut scheduler = config.digest_scheduler();
    let mut ticker = tokio::time::interval(Duration::from_secs(60));
    loop {
        ticker.tick().await;
        let tasks = db.list(&TaskFilter::default())?;
        if let Some(event) = scheduler.poll(Utc::now(), &Local, &tasks) {
            println!("{}", serde_json::to_string(&event)?);
        }
    }
}
