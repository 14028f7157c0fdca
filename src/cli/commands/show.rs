//! Show command - display the persisted sync state

use crate::cli::args::{OutputFormat, ShowArgs};
use crate::config::Config;
use crate::error::SyncResult;
use crate::state::{read_state_file, state_file_path, SyncState, TomlFormat};
use crate::ui::{self, UiContext};
use console::style;

/// Execute the show command
pub async fn execute(args: ShowArgs, config: &Config) -> SyncResult<()> {
    let build_dir = args
        .build_dir
        .unwrap_or_else(|| config.sync.build_dir.clone());
    let path = state_file_path(&build_dir);

    let Some(state) = read_state_file(&path, &TomlFormat) else {
        match args.format {
            OutputFormat::Json => println!("null"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, &format!("No sync state found at {}", path.display()));
            }
        }
        return Ok(());
    };

    match args.format {
        OutputFormat::Table => print_table(&state),
        OutputFormat::Json => print_json(&state)?,
        OutputFormat::Plain => print_plain(&state),
    }

    Ok(())
}

fn print_table(state: &SyncState) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Sync state");
    ui::key_value(
        &ctx,
        "Dependency layer",
        if state.dependency_layer { "enabled" } else { "disabled" },
    );
    println!();

    println!(
        "{:<40} {:<20} {:<20}",
        style("RESOURCE").bold(),
        style("HASH").bold(),
        style("SYNCED").bold()
    );
    println!("{}", "-".repeat(80));

    for (resource_id, record) in &state.resource_records {
        let synced = record.sync_time.format("%Y-%m-%d %H:%M:%S").to_string();
        println!(
            "{:<40} {:<20} {:<20}",
            resource_id,
            short_hash(&record.hash_value),
            synced
        );
    }

    println!();
    println!("{} resource(s)", state.resource_records.len());
}

fn print_json(state: &SyncState) -> SyncResult<()> {
    println!("{}", serde_json::to_string_pretty(state)?);
    Ok(())
}

fn print_plain(state: &SyncState) {
    for (resource_id, record) in &state.resource_records {
        println!("{} {}", resource_id, record.hash_value);
    }
}

fn short_hash(hash: &str) -> &str {
    hash.char_indices()
        .nth(16)
        .map_or(hash, |(end, _)| &hash[..end])
}
