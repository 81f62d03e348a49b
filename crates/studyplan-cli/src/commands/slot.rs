use clap::Subcommand;

use super::{open_service, CliResult};

#[derive(Subcommand)]
pub enum SlotAction {
    /// Mark a planned session as done
    Done {
        /// Task ID
        task_id: String,
        /// Slot ID (e.g. "<task-id>-1")
        slot_id: String,
        /// Clear the done flag instead
        #[arg(long)]
        undo: bool,
    },
}

pub fn run(action: SlotAction) -> CliResult {
    match action {
        SlotAction::Done {
            task_id,
            slot_id,
            undo,
        } => {
            let service = open_service()?;
            let task = service.mark_slot(&task_id, &slot_id, !undo)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
    }
    Ok(())
}
