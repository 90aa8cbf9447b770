//! Integration tests for stagecache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn stagecache() -> Command {
        let mut cmd = cargo_bin_cmd!("stagecache");
        cmd.env_remove("STAGECACHE_CONFIG");
        cmd
    }

    #[test]
    fn help_displays() {
        stagecache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("incremental stage cache"));
    }

    #[test]
    fn version_displays() {
        stagecache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("stagecache"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        stagecache()
            .current_dir(temp.path())
            .args(["--no-local", "config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        stagecache()
            .current_dir(temp.path())
            .args(["--no-local", "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[build]"))
            .stdout(predicate::str::contains("stage_count = 4"));
    }

    #[test]
    fn config_init_writes_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("conf").join("stagecache.toml");

        stagecache()
            .arg("--config")
            .arg(&path)
            .args(["config", "init"])
            .assert()
            .success();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("cache_dir"));
    }

    #[test]
    fn missing_explicit_config_fails() {
        let temp = TempDir::new().unwrap();
        stagecache()
            .arg("--config")
            .arg(temp.path().join("absent.toml"))
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Configuration file not found"))
            .stderr(predicate::str::contains("config init"));
    }

    #[test]
    fn status_outside_repository_fails() {
        let temp = TempDir::new().unwrap();
        stagecache()
            .current_dir(temp.path())
            .args(["--no-local", "status"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cannot determine current version of stage0"));
    }

    #[test]
    fn cache_clear_rejects_unknown_stage() {
        let temp = TempDir::new().unwrap();
        stagecache()
            .current_dir(temp.path())
            .args(["--no-local", "cache", "clear", "--stage", "9", "--yes"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("out of range"));
    }

    #[test]
    fn build_requires_root() {
        if stagecache::privilege::is_root() {
            return;
        }
        let temp = TempDir::new().unwrap();
        stagecache()
            .current_dir(temp.path())
            .args(["--no-local", "build"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Must be run as root"))
            .stderr(predicate::str::contains("Run with sudo"));
    }
}

mod pipeline_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use std::process::Command as StdCommand;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
[paths]
work_dir = "work"
cache_dir = "cache"

[build]
stage_count = 2
command = ["sh", "build.sh"]
"#;

    // Writes a marker file into every stage that is not flagged SKIP
    const BUILD_SCRIPT: &str = r#"
for n in 0 1; do
    if [ ! -f "work/stage$n/SKIP" ]; then
        mkdir -p "work/stage$n/rootfs"
        echo "$n" > "work/stage$n/rootfs/built"
    fi
done
"#;

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = StdCommand::new("git")
            .current_dir(dir)
            .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
            .args(args)
            .output()
            .expect("git should be installed");
        assert!(output.status.success(), "git {:?} failed", args);
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Two-stage build tree under git with one commit per stage
    fn build_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        git(root, &["init", "-q"]);

        std::fs::write(root.join("stagecache.toml"), CONFIG).unwrap();
        std::fs::write(root.join("build.sh"), BUILD_SCRIPT).unwrap();
        for n in 0..2 {
            let stage = root.join(format!("stage{n}"));
            std::fs::create_dir_all(&stage).unwrap();
            std::fs::write(stage.join("packages"), format!("pkg-{n}\n")).unwrap();
            git(root, &["add", "."]);
            git(root, &["commit", "-q", "-m", &format!("stage{n}")]);
        }
        temp
    }

    fn stagecache(dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("stagecache");
        cmd.env_remove("STAGECACHE_CONFIG").current_dir(dir);
        cmd
    }

    #[test]
    fn status_reports_empty_cache() {
        let tree = build_tree();
        stagecache(tree.path())
            .args(["status", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("stage0 build"))
            .stdout(predicate::str::contains("stage1 build"));
    }

    #[test]
    fn status_json_lists_first_stage() {
        let tree = build_tree();
        let output = stagecache(tree.path())
            .args(["status", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["stage_count"], 2);
        assert_eq!(json["first_stage_to_build"], 0);
    }

    #[test]
    fn status_uses_cached_stage() {
        let tree = build_tree();
        let root = tree.path();
        let head = git(root, &["log", "-n", "1", "--pretty=format:%H", "--", "stage0"]);
        std::fs::create_dir_all(root.join("cache/stage0").join(&head).join("rootfs")).unwrap();

        stagecache(root)
            .args(["status", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("stage0 skip"))
            .stdout(predicate::str::contains("stage1 build"));
    }

    #[test]
    fn cache_list_shows_entries() {
        let tree = build_tree();
        let root = tree.path();
        std::fs::create_dir_all(root.join("cache/stage1/abc123/rootfs")).unwrap();

        stagecache(root)
            .args(["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("stage0 -"))
            .stdout(predicate::str::contains("stage1 abc123"));
    }

    #[test]
    fn build_caches_and_then_skips_everything() {
        if !stagecache::privilege::is_root() {
            return;
        }
        let tree = build_tree();
        let root = tree.path();

        stagecache(root).arg("build").assert().success();

        for n in 0..2 {
            let stage = format!("stage{n}");
            let version = git(root, &["log", "-n", "1", "--pretty=format:%H", "--", &stage]);
            let built = root.join("cache").join(&stage).join(&version).join("rootfs/built");
            assert!(built.is_file(), "{stage} was not cached");
        }

        // Second run restores the last stage and skips both
        std::fs::remove_dir_all(root.join("work")).unwrap();
        stagecache(root).arg("build").assert().success();

        assert!(root.join("work/stage0/SKIP").is_file());
        assert!(root.join("work/stage1/SKIP").is_file());
        assert!(root.join("work/stage1/rootfs/built").is_file());
        assert!(!root.join("work/stage0/rootfs").exists());
    }

    #[test]
    fn cache_clear_removes_one_stage() {
        if !stagecache::privilege::is_root() {
            return;
        }
        let tree = build_tree();
        let root = tree.path();
        std::fs::create_dir_all(root.join("cache/stage0/aaa/rootfs")).unwrap();
        std::fs::create_dir_all(root.join("cache/stage1/bbb/rootfs")).unwrap();

        stagecache(root)
            .args(["cache", "clear", "--stage", "1", "--yes"])
            .assert()
            .success();

        assert!(root.join("cache/stage0/aaa").exists());
        assert!(!root.join("cache/stage1/bbb").exists());
    }
}
