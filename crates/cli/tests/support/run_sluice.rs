use std::{
    io::Write,
    process::{Command, Output, Stdio},
};

const CREDENTIAL_ENVS: [&str; 4] = [
    "ELASTIC_API_ID",
    "ELASTIC_API_KEY",
    "TWILIO_ACCOUNT_SID",
    "TWILIO_AUTH_TOKEN",
];

fn sluice_command(args: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_sluice"));
    command.args(args).env_remove("RUST_LOG");
    for name in CREDENTIAL_ENVS {
        command.env_remove(name);
    }
    command
}

#[allow(dead_code)]
pub fn run_sluice(args: &[&str]) -> Output {
    sluice_command(args)
        .output()
        .unwrap_or_else(|error| panic!("failed to run sluice: {error}"))
}

#[allow(dead_code)]
pub fn run_sluice_with_env(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = sluice_command(args);
    for (name, value) in env {
        command.env(name, value);
    }
    command
        .output()
        .unwrap_or_else(|error| panic!("failed to run sluice: {error}"))
}

#[allow(dead_code)]
pub fn run_sluice_with_stdin(args: &[&str], stdin_payload: &str) -> Output {
    let mut child = sluice_command(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap_or_else(|error| panic!("failed to run sluice with stdin: {error}"));

    let mut stdin = child
        .stdin
        .take()
        .unwrap_or_else(|| panic!("failed to capture child stdin"));
    stdin
        .write_all(stdin_payload.as_bytes())
        .unwrap_or_else(|error| panic!("failed to write stdin payload: {error}"));
    drop(stdin);

    child
        .wait_with_output()
        .unwrap_or_else(|error| panic!("failed to wait for sluice: {error}"))
}
