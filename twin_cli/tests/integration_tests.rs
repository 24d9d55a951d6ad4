//! Integration tests for the glucotwin binary.
//!
//! These tests verify end-to-end behavior including:
//! - Profile storage and the missing-profile hint
//! - Food checks, dose and alert commands
//! - Reproducible seeded forecasts and CSV export
//! - Custom foods from the config file

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI pointed at an isolated data and config directory
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("glucotwin"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

fn set_profile(dir: &Path, diabetes_type: &str, current_bg: &str) {
    cli(dir)
        .args([
            "profile",
            "set",
            "--age",
            "25",
            "--weight",
            "70",
            "--height",
            "175",
            "--diabetes-type",
            diabetes_type,
            "--activity",
            "sedentary",
            "--current-bg",
            current_bg,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile saved"));
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.arg("--json").output().expect("Failed to run CLI");
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("Output is not JSON")
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("glucotwin"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Diabetic digital twin"));
}

#[test]
fn test_missing_profile_hints_at_profile_set() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("dose")
        .assert()
        .failure()
        .stderr(predicate::str::contains("glucotwin profile set"));
}

#[test]
fn test_profile_set_and_show() {
    let temp_dir = setup_test_dir();
    set_profile(temp_dir.path(), "type1", "200");

    assert!(temp_dir.path().join("data/profile.json").exists());

    let profile = json_output(cli(temp_dir.path()).args(["profile", "show"]));
    assert_eq!(profile["diabetes_type"], "type1");
    assert_eq!(profile["current_bg"], 200);
    assert_eq!(profile["activity"], "sedentary");
}

#[test]
fn test_profile_set_rejects_out_of_range_glucose() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args([
            "profile",
            "set",
            "--age",
            "30",
            "--weight",
            "70",
            "--height",
            "170",
            "--diabetes-type",
            "type2",
            "--activity",
            "light",
            "--current-bg",
            "900",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside 20-600"));

    assert!(!temp_dir.path().join("data/profile.json").exists());
}

#[test]
fn test_profile_set_rejects_unknown_diabetes_type() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args([
            "profile",
            "set",
            "--age",
            "30",
            "--weight",
            "70",
            "--height",
            "170",
            "--diabetes-type",
            "gestational",
            "--activity",
            "light",
            "--current-bg",
            "120",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown diabetes type"));
}

#[test]
fn test_profile_override_path() {
    let temp_dir = setup_test_dir();
    let profile_file = temp_dir.path().join("elsewhere/me.json");

    cli(temp_dir.path())
        .arg("--profile")
        .arg(&profile_file)
        .args([
            "profile",
            "set",
            "--age",
            "40",
            "--weight",
            "80",
            "--height",
            "180",
            "--diabetes-type",
            "type2",
            "--activity",
            "moderate",
            "--current-bg",
            "140",
        ])
        .assert()
        .success();

    assert!(profile_file.exists());
    assert!(!temp_dir.path().join("data/profile.json").exists());
}

#[test]
fn test_dose_reference_case() {
    let temp_dir = setup_test_dir();
    set_profile(temp_dir.path(), "type1", "200");

    let dose = json_output(cli(temp_dir.path()).args(["dose", "--carbs", "60"]));
    assert_eq!(dose["correction_dose"], 2.0);
    assert_eq!(dose["carb_dose"], 4.0);
    assert_eq!(dose["total_insulin"], 6.0);
    assert_eq!(dose["sensitivity_factor"], 1.0);
    assert_eq!(dose["warnings"].as_array().unwrap().len(), 0);
}

#[test]
fn test_dose_text_output() {
    let temp_dir = setup_test_dir();
    set_profile(temp_dir.path(), "type1", "200");

    cli(temp_dir.path())
        .args(["dose", "--carbs", "60"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INSULIN DOSE"))
        .stdout(predicate::str::contains("Total:       6 units"));
}

#[test]
fn test_dose_prediabetes_has_no_rule() {
    let temp_dir = setup_test_dir();
    set_profile(temp_dir.path(), "prediabetes", "110");

    let dose = json_output(cli(temp_dir.path()).arg("dose"));
    assert!(dose.is_null());

    cli(temp_dir.path())
        .arg("dose")
        .assert()
        .success()
        .stdout(predicate::str::contains("No insulin dosing rule"));
}

#[test]
fn test_food_sugar_is_warning() {
    let temp_dir = setup_test_dir();

    // Glucose given explicitly, so no profile is needed
    let verdict = json_output(cli(temp_dir.path()).args([
        "food", "sugar", "--grams", "50", "--glucose", "100",
    ]));
    assert_eq!(verdict["safety"], "warning");
    assert_eq!(verdict["impact"]["net_carbs"], 50.0);
    assert_eq!(verdict["impact"]["glycemic_load"], 50.0);
    assert_eq!(verdict["impact"]["projected_glucose"], 225.0);
}

#[test]
fn test_food_unknown() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["food", "nonexistent-food-xyz", "--grams", "10", "--glucose", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("UNKNOWN"))
        .stdout(predicate::str::contains("consult your nutritionist"));
}

#[test]
fn test_food_uses_profile_glucose_by_default() {
    let temp_dir = setup_test_dir();
    set_profile(temp_dir.path(), "type2", "100");

    let verdict = json_output(cli(temp_dir.path()).args(["food", "chicken breast"]));
    assert_eq!(verdict["safety"], "safe");
    assert_eq!(verdict["impact"]["projected_glucose"], 100.0);
}

#[test]
fn test_custom_food_from_config() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config/glucotwin");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        r#"
[[foods.custom]]
name = "Teff Porridge"
carbs_per_100g = 20.0
glycemic_index = 45
category = "grain"
"#,
    )
    .unwrap();

    let verdict = json_output(cli(temp_dir.path()).args([
        "food", "teff", "--grams", "100", "--glucose", "100",
    ]));
    assert_eq!(verdict["impact"]["matched_food"], "teff porridge");
    assert_eq!(verdict["impact"]["net_carbs"], 20.0);
}

#[test]
fn test_invalid_custom_food_is_rejected() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config/glucotwin");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        r#"
[[foods.custom]]
name = "Impossible Cake"
carbs_per_100g = 150.0
glycemic_index = 90
category = "sweet"
"#,
    )
    .unwrap();

    cli(temp_dir.path())
        .args(["food", "cake", "--glucose", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside 0-100"));
}

#[test]
fn test_alerts_with_trend_flags() {
    let temp_dir = setup_test_dir();
    set_profile(temp_dir.path(), "type1", "120");

    cli(temp_dir.path())
        .args(["alerts", "--glucose", "60"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[EMERGENCY] Hypoglycemia Alert"));

    let alerts = json_output(cli(temp_dir.path()).args(["alerts", "--rising-rapidly"]));
    let titles: Vec<_> = alerts
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Rapid Rise Detected"]);

    cli(temp_dir.path())
        .arg("alerts")
        .assert()
        .success()
        .stdout(predicate::str::contains("No alerts at 120 mg/dL"));
}

#[test]
fn test_alert_trend_flags_conflict() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["alerts", "--rising-rapidly", "--falling-rapidly"])
        .assert()
        .failure();
}

#[test]
fn test_seeded_forecast_is_reproducible() {
    let temp_dir = setup_test_dir();
    set_profile(temp_dir.path(), "type2", "150");

    let args = ["predict", "--carbs", "45", "--hour", "8", "--seed", "42"];
    let first = json_output(cli(temp_dir.path()).args(args));
    let second = json_output(cli(temp_dir.path()).args(args));

    assert_eq!(first["points"], second["points"]);
    assert_ne!(first["id"], second["id"]);

    let points = first["points"].as_array().unwrap();
    assert_eq!(points.len(), 24);
    for point in points {
        let glucose = point["glucose"].as_f64().unwrap();
        assert!((50.0..=400.0).contains(&glucose));
    }
}

#[test]
fn test_predict_rejects_invalid_hour() {
    let temp_dir = setup_test_dir();
    set_profile(temp_dir.path(), "type1", "120");

    cli(temp_dir.path())
        .args(["predict", "--hour", "24"])
        .assert()
        .failure();
}

#[test]
fn test_predict_exports_csv() {
    let temp_dir = setup_test_dir();
    set_profile(temp_dir.path(), "type1", "130");
    let csv_path = temp_dir.path().join("exports/forecast.csv");

    cli(temp_dir.path())
        .args(["predict", "--hour", "6", "--seed", "1", "--csv"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 24 forecast rows"));

    let contents = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(contents.lines().count(), 25);
    assert!(contents.starts_with("hour,clock_hour,glucose"));
}

#[test]
fn test_default_command_is_assess() {
    let temp_dir = setup_test_dir();
    set_profile(temp_dir.path(), "type1", "300");

    cli(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Hyperglycemia Alert"))
        .stdout(predicate::str::contains("INSULIN DOSE"))
        .stdout(predicate::str::contains("24-HOUR FORECAST"));
}

#[test]
fn test_assess_json_uses_dose_as_planned_insulin() {
    let temp_dir = setup_test_dir();
    set_profile(temp_dir.path(), "type1", "200");

    let assessment = json_output(cli(temp_dir.path()).args(["assess", "--seed", "3"]));
    // 0 carbs at 200 mg/dL: correction only
    assert_eq!(assessment["dose"]["total_insulin"], 2.0);
    assert_eq!(assessment["forecast"]["points"].as_array().unwrap().len(), 24);
    assert_eq!(assessment["alerts"][0]["title"], "Elevated Glucose");
}

#[test]
fn test_plan_has_seven_days() {
    let temp_dir = setup_test_dir();
    set_profile(temp_dir.path(), "type2", "140");

    let plan = json_output(cli(temp_dir.path()).args(["plan", "--seed", "9"]));
    let days = plan["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["day"], "Monday");
    for day in days {
        assert!(day["breakfast"]["protein"].is_string());
        assert!(day["snacks"]["items"].is_array());
    }
}

#[test]
fn test_reading_reports_trend() {
    let temp_dir = setup_test_dir();
    set_profile(temp_dir.path(), "type1", "120");

    let reading = json_output(cli(temp_dir.path()).args(["reading", "--seed", "5"]));
    assert!(reading["glucose"].as_f64().is_some());
    assert_eq!(reading["confidence"], 0.85);
    assert!(["rising", "falling", "stable"].contains(&reading["trend"].as_str().unwrap()));
}

#[test]
fn test_plan_text_uses_full_day_names() {
    let temp_dir = setup_test_dir();
    set_profile(temp_dir.path(), "type1", "120");

    cli(temp_dir.path())
        .args(["plan", "--seed", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WEEKLY DIET PLAN"))
        .stdout(predicate::str::contains("  Monday"))
        .stdout(predicate::str::contains("  Sunday"));
}
