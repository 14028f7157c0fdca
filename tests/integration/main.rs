//! Integration tests for syncstate

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn syncstate() -> Command {
        cargo_bin_cmd!("syncstate")
    }

    /// Command isolated from the user's global and local configuration
    fn syncstate_in(dir: &Path) -> Command {
        let mut cmd = syncstate();
        cmd.current_dir(dir)
            .env_remove("CI")
            .arg("--no-local")
            .arg("--config")
            .arg(dir.join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        syncstate()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("change-detection cache"));
    }

    #[test]
    fn version_displays() {
        syncstate()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("syncstate"));
    }

    #[test]
    fn record_then_get() {
        let temp = TempDir::new().unwrap();

        syncstate_in(temp.path())
            .args(["record", "Function=aaa", "Parent/Child=bbb"])
            .assert()
            .success()
            .stdout(predicate::str::contains("2 of 2 resource(s) recorded"));

        assert!(temp.path().join(".syncstate").join("sync.toml").exists());

        syncstate_in(temp.path())
            .args(["get", "Parent/Child"])
            .assert()
            .success()
            .stdout(predicate::str::diff("bbb\n"));
    }

    #[test]
    fn record_skips_unchanged() {
        let temp = TempDir::new().unwrap();

        syncstate_in(temp.path())
            .args(["record", "Function=aaa"])
            .assert()
            .success();

        syncstate_in(temp.path())
            .args(["record", "Function=aaa", "Layer=ccc"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Function (unchanged)"))
            .stdout(predicate::str::contains("1 of 2 resource(s) recorded"));
    }

    #[test]
    fn record_rejects_malformed_resource() {
        let temp = TempDir::new().unwrap();

        syncstate_in(temp.path())
            .args(["record", "Function"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("RESOURCE_ID=HASH"));
    }

    #[test]
    fn get_missing_resource() {
        let temp = TempDir::new().unwrap();

        syncstate_in(temp.path())
            .args(["get", "Function"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No sync state recorded for Function"));
    }

    #[test]
    fn show_empty() {
        let temp = TempDir::new().unwrap();

        syncstate_in(temp.path())
            .args(["show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No sync state found"));
    }

    #[test]
    fn show_json() {
        let temp = TempDir::new().unwrap();
        syncstate_in(temp.path())
            .args(["record", "--dependency-layer", "false", "Stack/Function=abc"])
            .assert()
            .success();

        let output = syncstate_in(temp.path())
            .args(["show", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(parsed["dependency_layer"], false);
        assert_eq!(
            parsed["resource_records"]["Stack/Function"]["hash_value"],
            "abc"
        );
    }

    #[test]
    fn mode_switch_removes_build_dir() {
        let temp = TempDir::new().unwrap();
        let build = temp.path().join(".syncstate").join("build");

        syncstate_in(temp.path())
            .args(["record", "--dependency-layer", "true", "Function=aaa"])
            .assert()
            .success();
        std::fs::create_dir_all(build.join("Function")).unwrap();

        syncstate_in(temp.path())
            .args(["record", "--dependency-layer", "false", "Function=aaa"])
            .assert()
            .success();

        assert!(!build.exists());
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();

        syncstate_in(temp.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();

        syncstate_in(temp.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[sync]"));
    }

    #[test]
    fn local_config_sets_build_dir() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".syncstate.toml"),
            "[sync]\nbuild_dir = \"out/build\"\n",
        )
        .unwrap();

        syncstate()
            .current_dir(temp.path())
            .arg("--config")
            .arg(temp.path().join("config.toml"))
            .args(["record", "Function=aaa"])
            .assert()
            .success();

        assert!(temp.path().join("out").join("sync.toml").exists());
    }
}
