//! End-to-end tests of the `murmur` binary.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STORY: &str = r#"{
  "title": "Signal",
  "protagonist": "Maya",
  "start": "intro",
  "nodes": [
    {
      "id": "intro",
      "speaker": "maya",
      "text": "Hello? Is anyone out there?",
      "choices": [
        {
          "id": "yes",
          "text": "I'm here.",
          "target": "shelter",
          "effects": [{ "op": "set_flag", "flag": "answered" }]
        },
        { "id": "no", "text": "...", "target": "alone" }
      ]
    },
    {
      "id": "shelter",
      "speaker": "maya",
      "text": "Thank goodness. I'm heading for the roof.",
      "followups": [{ "text": "The water is rising.", "delay_ms": 100 }],
      "wait_time_ms": 600000,
      "activity_message": "Maya is climbing the stairwell.",
      "on_enter": [{ "op": "set_location", "location": "stairwell" }]
    },
    { "id": "alone", "speaker": "system", "text": "Nobody answered." }
  ],
  "endings": [
    {
      "id": "rescued",
      "category": "good",
      "text": "Maya reached the roof and was rescued.",
      "condition": { "check": "flag_set", "flag": "answered" }
    },
    {
      "id": "quiet",
      "category": "neutral",
      "text": "The line went quiet.",
      "condition": { "check": "always" }
    }
  ]
}
"#;

/// Create a temp directory with a story file and an empty save directory.
fn workspace() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let story = dir.path().join("signal.json");
    fs::write(&story, STORY).unwrap();
    let saves = dir.path().join("saves");
    (dir, story, saves)
}

fn murmur(saves: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("murmur").unwrap();
    cmd.arg("--saves").arg(saves);
    cmd
}

fn auto_play(saves: &PathBuf, story: &PathBuf) -> Command {
    let mut cmd = murmur(saves);
    cmd.arg("play")
        .arg(story)
        .args(["--auto", "--compressed", "--pause-ms", "0"]);
    cmd
}

#[test]
fn check_valid_story() {
    let (_dir, story, saves) = workspace();
    murmur(&saves)
        .arg("check")
        .arg(&story)
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed for 'Signal'"))
        .stdout(predicate::str::contains("3 nodes, 2 endings"));
}

#[test]
fn check_reports_dangling_target() {
    let (dir, _story, saves) = workspace();
    let broken = dir.path().join("broken.json");
    fs::write(&broken, STORY.replace("\"target\": \"alone\"", "\"target\": \"nowhere\"")).unwrap();

    murmur(&saves)
        .arg("check")
        .arg(&broken)
        .assert()
        .failure()
        .stderr(predicate::str::contains("targets unknown node 'nowhere'"))
        .stderr(predicate::str::contains("validation failed"));
}

#[test]
fn check_rejects_malformed_story() {
    let (dir, _story, saves) = workspace();
    let bad = dir.path().join("bad.json");
    fs::write(&bad, "{ \"title\": ").unwrap();

    murmur(&saves)
        .arg("check")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn auto_play_reaches_an_ending() {
    let (_dir, story, saves) = workspace();
    auto_play(&saves, &story)
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello? Is anyone out there?"))
        .stdout(predicate::str::contains("I'm here."))
        .stdout(predicate::str::contains("The water is rising."))
        .stdout(predicate::str::contains("Maya is offline."))
        .stdout(predicate::str::contains("Maya is climbing the stairwell."))
        .stdout(predicate::str::contains("[GOOD ENDING]"))
        .stdout(predicate::str::contains("Maya reached the roof and was rescued."));
}

#[test]
fn finished_game_is_not_replayed() {
    let (_dir, story, saves) = workspace();
    auto_play(&saves, &story).assert().success();

    auto_play(&saves, &story)
        .assert()
        .success()
        .stdout(predicate::function(|out: &str| {
            out.matches("[GOOD ENDING]").count() == 1
                && out.matches("Hello? Is anyone out there?").count() == 1
        }));
}

#[test]
fn status_without_save() {
    let (_dir, _story, saves) = workspace();
    murmur(&saves)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved game"));
}

#[test]
fn status_after_play() {
    let (_dir, story, saves) = workspace();
    auto_play(&saves, &story).assert().success();

    murmur(&saves)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("shelter"))
        .stdout(predicate::str::contains("ended (rescued)"))
        .stdout(predicate::str::contains("stairwell"))
        .stdout(predicate::str::contains("answered"));
}

#[test]
fn slots_are_separate() {
    let (_dir, story, saves) = workspace();
    auto_play(&saves, &story).assert().success();

    murmur(&saves)
        .args(["--slot", "second", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved game in slot 'second'"));
}

#[test]
fn export_then_import_into_another_slot() {
    let (dir, story, saves) = workspace();
    auto_play(&saves, &story).assert().success();

    let bundle = dir.path().join("bundle.json");
    murmur(&saves)
        .arg("export")
        .arg("--output")
        .arg(&bundle)
        .assert()
        .success();
    let exported = fs::read_to_string(&bundle).unwrap();
    assert!(exported.contains("\"gameState\""));
    assert!(exported.contains("\"exportDate\""));

    murmur(&saves)
        .args(["--slot", "copy", "import"])
        .arg(&bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("into slot 'copy'"));

    murmur(&saves)
        .args(["--slot", "copy", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ended (rescued)"));
}

#[test]
fn export_to_stdout() {
    let (_dir, story, saves) = workspace();
    auto_play(&saves, &story).assert().success();

    murmur(&saves)
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"messages\""));
}

#[test]
fn import_rejects_malformed_bundle() {
    let (dir, story, saves) = workspace();
    auto_play(&saves, &story).assert().success();

    let bad = dir.path().join("bad.json");
    fs::write(&bad, "{\"gameState\": 7}").unwrap();
    murmur(&saves)
        .arg("import")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to import"));

    murmur(&saves)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("ended (rescued)"));
}

#[test]
fn reset_clears_the_save() {
    let (_dir, story, saves) = workspace();
    auto_play(&saves, &story).assert().success();

    murmur(&saves)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Save cleared"));

    murmur(&saves)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved game"));
}

#[test]
fn settings_show_defaults() {
    let (_dir, _story, saves) = workspace();
    murmur(&saves)
        .arg("settings")
        .assert()
        .success()
        .stdout(predicate::str::contains("use_real_time"))
        .stdout(predicate::str::contains("(not set)"))
        .stdout(predicate::str::contains("dark"));
}

#[test]
fn settings_set_and_mask_key() {
    let (_dir, _story, saves) = workspace();
    murmur(&saves)
        .args(["settings", "set", "ai_api_key", "sk-test-9876"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ai_api_key = ****9876"));

    murmur(&saves)
        .arg("settings")
        .assert()
        .success()
        .stdout(predicate::str::contains("****9876"))
        .stdout(predicate::str::contains("sk-test").not());
}

#[test]
fn settings_reject_unknown_key() {
    let (_dir, _story, saves) = workspace();
    murmur(&saves)
        .args(["settings", "set", "volume", "11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown setting: volume"));
}

#[test]
fn compressed_setting_is_used_without_flags() {
    let (_dir, story, saves) = workspace();
    murmur(&saves)
        .args(["settings", "set", "use_real_time", "off"])
        .assert()
        .success();

    murmur(&saves)
        .env("MURMUR_LOG", "off")
        .arg("play")
        .arg(&story)
        .args(["--auto", "--pause-ms", "0"])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("[GOOD ENDING]"));
}
