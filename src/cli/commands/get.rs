//! Get command - print the last synced hash of a resource

use crate::cli::args::GetArgs;
use crate::config::Config;
use crate::error::{SyncError, SyncResult};
use crate::state::{read_state_file, state_file_path, TomlFormat};
use tracing::debug;

/// Execute the get command
pub async fn execute(args: GetArgs, config: &Config) -> SyncResult<()> {
    let hash = lookup(&args, config)?;
    println!("{}", hash);
    Ok(())
}

/// Resolve the recorded hash without opening a session
fn lookup(args: &GetArgs, config: &Config) -> SyncResult<String> {
    let build_dir = args
        .build_dir
        .clone()
        .unwrap_or_else(|| config.sync.build_dir.clone());
    let path = state_file_path(&build_dir);
    debug!("Reading sync state from {}", path.display());

    read_state_file(&path, &TomlFormat)
        .and_then(|state| state.hash_for(&args.resource_id).map(str::to_string))
        .ok_or_else(|| SyncError::ResourceNotFound(args.resource_id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SyncStateStore;
    use tempfile::TempDir;

    fn get_args(temp: &TempDir, resource_id: &str) -> GetArgs {
        GetArgs {
            resource_id: resource_id.to_string(),
            build_dir: Some(temp.path().join("build")),
        }
    }

    #[test]
    fn finds_recorded_hash() {
        let temp = TempDir::new().unwrap();
        SyncStateStore::new(true, temp.path().join("build"), temp.path().join("cache"))
            .run(|session| session.update_resource_sync_state("Stack/Function", "abc"))
            .unwrap();

        let hash = lookup(&get_args(&temp, "Stack/Function"), &Config::default()).unwrap();
        assert_eq!(hash, "abc");
    }

    #[test]
    fn missing_resource_is_error() {
        let temp = TempDir::new().unwrap();

        let err = lookup(&get_args(&temp, "Function"), &Config::default()).unwrap_err();
        assert!(matches!(err, SyncError::ResourceNotFound(id) if id == "Function"));
    }
}
