use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary isolated from the user's config, settings and installed tools
fn trimkit(dir: &TempDir) -> Command {
    let resources = dir.path().join("resources");
    std::fs::create_dir_all(&resources).unwrap();

    let mut cmd = Command::cargo_bin("trimkit").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env("TRIMKIT_LOG_LEVEL", "warn")
        .env("TRIMKIT_SETTINGS_FILE", dir.path().join("settings.toml"))
        .env("TRIMKIT_RESOURCE_DIR", &resources);
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    trimkit(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("probe"))
        .stdout(predicate::str::contains("predict"))
        .stdout(predicate::str::contains("cut"))
        .stdout(predicate::str::contains("settings"));
}

#[test]
fn test_settings_are_persisted() {
    let dir = TempDir::new().unwrap();

    trimkit(&dir)
        .args(["settings", "--prefer-installed", "true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prefer_installed_tools = true"));

    trimkit(&dir)
        .arg("settings")
        .assert()
        .success()
        .stdout(predicate::str::contains("prefer_installed_tools = true"));

    let saved = std::fs::read_to_string(dir.path().join("settings.toml")).unwrap();
    assert!(saved.contains("use_installed_ffmpeg = true"));
}

#[test]
fn test_settings_default_to_bundled() {
    let dir = TempDir::new().unwrap();
    trimkit(&dir)
        .arg("settings")
        .assert()
        .success()
        .stdout(predicate::str::contains("prefer_installed_tools = false"));
}

#[test]
fn test_tools_reports_missing_bundled_tools() {
    let dir = TempDir::new().unwrap();
    trimkit(&dir)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg: not found"))
        .stdout(predicate::str::contains("ffprobe: not found"));
}

#[test]
fn test_probe_without_tools_fails() {
    let dir = TempDir::new().unwrap();
    trimkit(&dir)
        .args(["probe", "--input", "missing.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ffprobe was not found"));
}

#[test]
fn test_predict_rejects_empty_range() {
    let dir = TempDir::new().unwrap();
    trimkit(&dir)
        .args(["predict", "--input", "in.mp4", "--start", "5", "--end", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "End time must be greater than start time.",
        ));
}

#[test]
fn test_predict_rejects_bad_time() {
    let dir = TempDir::new().unwrap();
    trimkit(&dir)
        .args(["predict", "--input", "in.mp4", "--start", "1:75", "--end", "2:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Start time must be seconds or mm:ss"));
}

#[test]
fn test_cut_rejects_output_equal_to_input() {
    let dir = TempDir::new().unwrap();
    trimkit(&dir)
        .args([
            "cut", "--input", "clip.mp4", "--output", "clip.mp4", "--start", "0", "--end", "5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Output file must be different from input file.",
        ));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    trimkit(&dir)
        .args(["--config", "nope.toml", "settings"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file does not exist"));
}
