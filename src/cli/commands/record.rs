//! Record command - run a sync session and record resource hashes
//!
//! Each resource is handled by its own blocking worker, the way a sync
//! run updates resources concurrently. Resources whose hash matches the
//! last recorded one are left untouched.

use crate::cli::args::RecordArgs;
use crate::config::Config;
use crate::error::{SyncError, SyncResult};
use crate::state::{SyncChange, SyncSession, SyncStateStore};
use crate::ui::{self, UiContext};
use tokio::task::{self, JoinError};
use tracing::{debug, warn};

/// Execute the record command
pub async fn execute(args: RecordArgs, config: &Config) -> SyncResult<()> {
    let store = SyncStateStore::new(
        args.dependency_layer
            .unwrap_or(config.sync.dependency_layer),
        args.build_dir
            .unwrap_or_else(|| config.sync.build_dir.clone()),
        args.cache_dir
            .unwrap_or_else(|| config.sync.cache_dir.clone()),
    )
    .with_dependencies_dir(
        args.dependencies_dir
            .unwrap_or_else(|| config.sync.dependencies_dir.clone()),
    );

    let session = task::spawn_blocking(move || store.start())
        .await
        .map_err(worker_failed)??;
    debug!("Sync session opened at {}", session.state_file().display());

    let recorded = record_all(&session, args.resources).await;
    let stopped = task::spawn_blocking(move || session.stop())
        .await
        .map_err(worker_failed)?;

    let outcomes = recorded?;
    stopped?;

    print_outcomes(&outcomes);
    Ok(())
}

/// Record every resource concurrently, returning changes in input order
///
/// Every worker is awaited before returning. If any failed, the first
/// error in input order is returned.
pub async fn record_all(
    session: &SyncSession,
    resources: Vec<(String, String)>,
) -> SyncResult<Vec<(String, SyncChange)>> {
    let workers: Vec<_> = resources
        .into_iter()
        .map(|(resource_id, hash)| {
            let store = session.handle();
            task::spawn_blocking(move || {
                let change = store.record_resource_hash(&resource_id, &hash)?;
                Ok::<_, SyncError>((resource_id, change))
            })
        })
        .collect();

    let mut changes = Vec::with_capacity(workers.len());
    let mut first_error = None;
    for worker in workers {
        match worker.await.map_err(worker_failed).and_then(|result| result) {
            Ok(change) => changes.push(change),
            Err(e) if first_error.is_none() => first_error = Some(e),
            Err(e) => warn!("Additional sync worker failure: {}", e),
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(changes),
    }
}

fn worker_failed(e: JoinError) -> SyncError {
    SyncError::Internal(format!("sync worker failed: {}", e))
}

fn print_outcomes(outcomes: &[(String, SyncChange)]) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Sync state");

    for (resource_id, outcome) in outcomes {
        match outcome {
            SyncChange::New => ui::step_ok_detail(&ctx, resource_id, "new"),
            SyncChange::Changed { previous } => {
                ui::step_ok_detail(&ctx, resource_id, &format!("changed from {}", previous))
            }
            SyncChange::Unchanged => ui::step_info(&ctx, &format!("{} (unchanged)", resource_id)),
        }
    }

    let recorded = outcomes
        .iter()
        .filter(|(_, outcome)| *outcome != SyncChange::Unchanged)
        .count();
    ui::outro_success(
        &ctx,
        &format!("{} of {} resource(s) recorded", recorded, outcomes.len()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{read_state_file, TomlFormat};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(temp: &TempDir, pairs: &[(&str, &str)], dependency_layer: bool) -> RecordArgs {
        RecordArgs {
            resources: resources(pairs),
            build_dir: Some(temp.path().join("build")),
            cache_dir: Some(temp.path().join("cache")),
            dependencies_dir: Some(temp.path().join("deps")),
            dependency_layer: Some(dependency_layer),
        }
    }

    fn state_file(temp: &TempDir) -> PathBuf {
        temp.path().join("sync.toml")
    }

    #[tokio::test]
    async fn records_new_resources() {
        let temp = TempDir::new().unwrap();

        execute(
            args(&temp, &[("Function", "aaa"), ("Stack/Layer", "bbb")], true),
            &Config::default(),
        )
        .await
        .unwrap();

        let state = read_state_file(&state_file(&temp), &TomlFormat).unwrap();
        assert_eq!(state.hash_for("Function"), Some("aaa"));
        assert_eq!(state.hash_for("Stack/Layer"), Some("bbb"));
        assert!(state.dependency_layer);
    }

    #[tokio::test]
    async fn reports_changed_and_unchanged() {
        let temp = TempDir::new().unwrap();
        execute(args(&temp, &[("Function", "aaa"), ("Layer", "bbb")], true), &Config::default())
            .await
            .unwrap();

        let session = open_session(&temp);
        let changes = record_all(
            &session,
            resources(&[("Function", "aaa"), ("Layer", "ccc"), ("Api", "ddd")]),
        )
        .await
        .unwrap();
        session.stop().unwrap();

        assert_eq!(
            changes,
            vec![
                ("Function".to_string(), SyncChange::Unchanged),
                (
                    "Layer".to_string(),
                    SyncChange::Changed {
                        previous: "bbb".to_string()
                    }
                ),
                ("Api".to_string(), SyncChange::New),
            ]
        );
    }

    #[tokio::test]
    async fn mode_switch_wipes_build_dirs() {
        let temp = TempDir::new().unwrap();
        execute(args(&temp, &[("Function", "aaa")], true), &Config::default())
            .await
            .unwrap();
        for dir in ["build", "cache", "deps"] {
            std::fs::create_dir_all(temp.path().join(dir)).unwrap();
        }

        execute(args(&temp, &[("Layer", "bbb")], false), &Config::default())
            .await
            .unwrap();

        for dir in ["build", "cache", "deps"] {
            assert!(!temp.path().join(dir).exists(), "{} should be removed", dir);
        }
        let state = read_state_file(&state_file(&temp), &TomlFormat).unwrap();
        assert!(!state.dependency_layer);
        assert_eq!(state.hash_for("Function"), Some("aaa"));
        assert_eq!(state.hash_for("Layer"), Some("bbb"));
    }

    fn resources(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(id, hash)| (id.to_string(), hash.to_string()))
            .collect()
    }

    fn open_session(temp: &TempDir) -> SyncSession {
        SyncStateStore::new(true, temp.path().join("build"), temp.path().join("cache"))
            .with_dependencies_dir(temp.path().join("deps"))
            .start()
            .unwrap()
    }

    #[tokio::test]
    async fn duplicate_resource_is_new_once() {
        let temp = TempDir::new().unwrap();
        let session = open_session(&temp);

        let changes = record_all(&session, resources(&[("Function", "a"), ("Function", "b")]))
            .await
            .unwrap();
        session.stop().unwrap();

        let new = changes
            .iter()
            .filter(|(_, change)| *change == SyncChange::New)
            .count();
        assert_eq!(new, 1);
        assert!(changes
            .iter()
            .any(|(_, change)| matches!(change, SyncChange::Changed { .. })));
    }

    #[tokio::test]
    async fn failed_worker_waits_for_the_rest() {
        let temp = TempDir::new().unwrap();
        let session = open_session(&temp);
        session.update_resource_sync_state("Function", "aaa").unwrap();
        std::fs::remove_file(session.state_file()).unwrap();
        std::fs::create_dir(session.state_file()).unwrap();

        let err = record_all(
            &session,
            resources(&[("Layer", "bbb"), ("Function", "aaa"), ("Api", "ccc")]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SyncError::StatePersist { .. }));

        let current = session.current_state();
        assert_eq!(current.hash_for("Layer"), Some("bbb"));
        assert_eq!(current.hash_for("Function"), Some("aaa"));
        assert_eq!(current.hash_for("Api"), Some("ccc"));
        assert!(session.stop().is_err());
    }
}
