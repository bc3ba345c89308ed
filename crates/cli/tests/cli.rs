use assert_cmd::Command;

/// Fresh SQLite file per test so runs do not share bookings.
fn scratch_database(name: &str) -> String {
    let path = std::env::temp_dir().join(format!("savanna-cli-{}-{name}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    format!("sqlite://{}", path.display())
}

fn savanna() -> Command {
    let mut cmd = Command::cargo_bin("savanna").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("SAVANNA_ENV")
        .env("SAVANNA_CONFIG_DIR", env!("CARGO_MANIFEST_DIR"));
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = savanna().arg("--help").output().unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    for command in ["serve", "migrate", "openapi", "booking-status", "delete-booking"] {
        assert!(text.contains(command), "missing {command}");
    }
}

#[test]
fn openapi_prints_the_merged_document() {
    let output = savanna().arg("openapi").output().unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(doc["paths"]["/bookings"]["post"].is_object());
    assert!(doc["paths"]["/api/reviews/featured"]["get"].is_object());
    assert!(doc["components"]["schemas"]["Destination"].is_object());
}

#[test]
fn unknown_environment_is_rejected() {
    savanna().args(["--env", "qa", "openapi"]).assert().failure();
}

#[test]
fn booking_status_rejects_unknown_status() {
    let output = savanna()
        .args(["booking-status", "1", "shipped"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = String::from_utf8(output.stderr).unwrap();
    assert!(text.contains("shipped"));
}

#[test]
fn booking_status_for_missing_booking_fails() {
    savanna()
        .env("SAVANNA_DATABASE__URL", scratch_database("status"))
        .args(["booking-status", "42", "confirmed"])
        .assert()
        .failure();
}

#[test]
fn delete_of_missing_booking_fails_before_prompting() {
    savanna()
        .env("SAVANNA_DATABASE__URL", scratch_database("delete"))
        .args(["delete-booking", "42", "--yes"])
        .assert()
        .failure();
}
