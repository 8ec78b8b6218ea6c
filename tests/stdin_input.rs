// Exercises ',' by feeding bytes on stdin to `bf run`, and the EOF policy layers.
use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.timeout(Duration::from_secs(5))
        .env("BF_CONFIG", "/nonexistent/tree-bf/bf.toml")
        .env_remove("BF_EOF")
        .env_remove("BF_TRACE");
    cmd
}

#[test]
fn reads_from_stdin_and_echoes_byte() {
    cargo_bin()
        .arg("run").arg(",.")
        .write_stdin("Z")
        .assert()
        .success()
        .stdout("Z");
}

#[test]
fn cat_program_copies_stdin_until_eof() {
    cargo_bin()
        .arg("run").arg(",[.,]")
        .write_stdin("some input\nwith lines")
        .assert()
        .success()
        .stdout("some input\nwith lines");
}

#[test]
fn eof_defaults_to_zero() {
    cargo_bin()
        .arg("run").arg("+++,.")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::eq(&[0u8][..]));
}

#[test]
fn eof_flag_unchanged_keeps_cell() {
    cargo_bin()
        .arg("run").arg("--eof").arg("unchanged").arg("+++,.")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::eq(&[3u8][..]));
}

#[test]
fn eof_env_max_stores_255() {
    cargo_bin()
        .env("BF_EOF", "max")
        .arg("run").arg(",.")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::eq(&[255u8][..]));
}

#[test]
fn eof_flag_beats_env() {
    cargo_bin()
        .env("BF_EOF", "max")
        .arg("run").arg("--eof").arg("7").arg(",.")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::eq(&[7u8][..]));
}

#[test]
fn eof_from_config_file() {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "[run]\neof = \"unchanged\"\n").unwrap();
    cargo_bin()
        .env("BF_CONFIG", tf.path())
        .arg("run").arg("++,.")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::eq(&[2u8][..]));
}

#[test]
fn invalid_config_file_is_usage_error() {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "[run]\ntrace = loud\n").unwrap();
    cargo_bin()
        .env("BF_CONFIG", tf.path())
        .arg("run").arg("+")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn eof_from_xdg_config_home() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("bf.toml"), "[run]\neof = \"max\"\n").unwrap();
    cargo_bin()
        .env_remove("BF_CONFIG")
        .env("XDG_CONFIG_HOME", dir.path())
        .arg("run").arg(",.")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::eq(&[255u8][..]));
}
