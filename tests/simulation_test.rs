use std::process::{Command, Output};

fn run_simulation(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_subway_sim"))
        .args(args)
        .env("RUST_LOG", "warn,subway_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Pull the number following `label` out of a log line
fn parse_logged_value(stderr: &str, label: &str) -> f64 {
    let line = stderr
        .lines()
        .find(|line| line.contains(label))
        .unwrap_or_else(|| panic!("Could not find '{}' line", label));

    // Format: "[2026-10-18T17:10:52Z INFO  subway_sim] Cost savings accrued: $12.34"
    let parts: Vec<&str> = line.split(label).collect();
    let value = parts
        .get(1)
        .map(|s| s.trim().trim_start_matches('$').trim_end_matches('%'))
        .unwrap_or_else(|| panic!("Could not parse value from line: {}", line));

    value
        .parse()
        .unwrap_or_else(|_| panic!("Could not parse '{}' as a number", value))
}

/// Test that the simulation runs headless without crashing
#[test]
fn test_headless_simulation_runs() {
    let output = run_simulation(&["--ticks", "120"]);

    assert!(
        output.status.success(),
        "Simulation failed to run. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SIMULATION COMPLETE"),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("=== Final State ==="));
    assert!(stdout.contains("World Trade Center"));
}

/// Test that the final statistics are logged
#[test]
fn test_simulation_statistics_logged() {
    let output = run_simulation(&["--ticks", "60"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    for label in [
        "Logical ticks:",
        "Total passengers generated:",
        "Passengers delivered:",
        "System efficiency:",
        "Congestion score:",
        "Cost savings accrued:",
        "Projected daily savings:",
        "Projected annual savings:",
    ] {
        assert!(stderr.contains(label), "Missing '{}' statistic", label);
    }

    assert_eq!(parse_logged_value(&stderr, "Logical ticks:"), 60.0);
    assert!(parse_logged_value(&stderr, "Total passengers generated:") >= 2000.0);
}

/// Test that speed and rush hour change how much gets simulated
#[test]
fn test_speed_and_rush_hour_flags() {
    let output = run_simulation(&["--ticks", "100", "--speed", "2.5", "--rush-hour"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(parse_logged_value(&stderr, "Logical ticks:"), 250.0);
    assert!(parse_logged_value(&stderr, "Total passengers generated:") > 2000.0);
}

/// Test that dynamic routing produces savings and fixed routing does not
#[test]
fn test_dynamic_routing_savings() {
    let fixed = run_simulation(&["--ticks", "300", "--seed", "9"]);
    let dynamic = run_simulation(&["--ticks", "300", "--seed", "9", "--dynamic-routing"]);
    assert!(fixed.status.success() && dynamic.status.success());

    let fixed_stderr = String::from_utf8_lossy(&fixed.stderr);
    let dynamic_stderr = String::from_utf8_lossy(&dynamic.stderr);
    assert_eq!(parse_logged_value(&fixed_stderr, "Cost savings accrued:"), 0.0);
    assert!(parse_logged_value(&dynamic_stderr, "Cost savings accrued:") > 0.0);
}

/// Test that JSON reports are one parseable snapshot per line
#[test]
fn test_json_reports() {
    let output = run_simulation(&["--ticks", "30", "--report-every", "10", "--json"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let ticks: Vec<u64> = stdout
        .lines()
        .map(|line| {
            let value: serde_json::Value =
                serde_json::from_str(line).expect("report should be valid JSON");
            value["tick"].as_u64().expect("report should carry the tick")
        })
        .collect();
    assert_eq!(ticks, vec![10, 20, 30]);
}

/// Test that bad input is reported and fails the run
#[test]
fn test_invalid_input_fails() {
    let negative_speed = run_simulation(&["--ticks", "10", "--speed=-1"]);
    assert!(!negative_speed.status.success());

    let missing_scenario = run_simulation(&["--scenario", "/nonexistent/scenario.json"]);
    assert!(!missing_scenario.status.success());
    assert!(String::from_utf8_lossy(&missing_scenario.stderr).contains("scenario"));
}
