use chrono::Local;
use clap::Args;
use studyplan_core::WeeklyPlan;

use super::{open_service, CliResult};

#[derive(Args)]
pub struct WeeklyArgs {
    /// Print the raw JSON calendar
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: WeeklyArgs) -> CliResult {
    let service = open_service()?;
    let week = service.weekly()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&week)?);
    } else {
        print!("{}", render(&week));
    }
    Ok(())
}

fn render(week: &WeeklyPlan) -> String {
    let mut out = String::new();
    for day in &week.days {
        out.push_str(&format!(
            "{} ({} min)\n",
            day.date.format("%a %Y-%m-%d"),
            day.focus_minutes()
        ));
        for slot in &day.slots {
            let mark = match slot.done {
                Some(true) => "x",
                _ => " ",
            };
            out.push_str(&format!(
                "  [{mark}] {}-{}  {}\n",
                slot.start.with_timezone(&Local).format("%H:%M"),
                slot.end.with_timezone(&Local).format("%H:%M"),
                slot.id
            ));
        }
    }
    out
}
