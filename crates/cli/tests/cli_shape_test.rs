#[path = "support/run_sluice.rs"]
mod run_sluice;

use run_sluice::run_sluice;

#[test]
fn usage_lists_enabled_commands_only() {
    let output = run_sluice(&[]);

    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage: sluice [OPTIONS] <COMMAND>"));
    assert!(stderr.contains("sqlite"));
    assert!(stderr.contains("search"));
    assert!(stderr.contains("notify"));
    assert!(!stderr.contains("\n  mssql"));
}

#[cfg(not(feature = "mssql"))]
#[test]
fn rejects_disabled_mssql_subcommand_by_default() {
    let output = run_sluice(&["mssql"]);

    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized subcommand 'mssql'"));
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_help_uses_database_path_and_excludes_network_flags() {
    let output = run_sluice(&["sqlite", "--help"]);

    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<DATABASE>"));
    assert!(stdout.contains("--connect-attempts"));
    assert!(!stdout.contains("--host"));
    assert!(!stdout.contains("--port"));
    assert!(!stdout.contains("--password"));
}

#[cfg(feature = "postgres")]
#[test]
fn postgres_help_lists_connection_flags() {
    let output = run_sluice(&["postgres", "--help"]);

    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--host", "--port", "--user", "--password", "--isolation-level"] {
        assert!(stdout.contains(flag), "missing {flag} in: {stdout}");
    }
    assert!(stdout.contains("<DATABASE>"));
}

#[cfg(feature = "sqlite")]
#[test]
fn insert_requires_at_least_one_assignment() {
    let output = run_sluice(&["sqlite", ":memory:", "insert", "users"]);

    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--set <COLUMN=VALUE>"));
}

#[test]
fn search_help_lists_credential_flags() {
    let output = run_sluice(&["search", "--help"]);

    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--url", "--api-id", "--api-key", "--no-creds"] {
        assert!(stdout.contains(flag), "missing {flag} in: {stdout}");
    }
    for action in ["get-all", "insert", "delete"] {
        assert!(stdout.contains(action), "missing {action} in: {stdout}");
    }
}
