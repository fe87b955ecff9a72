// tests/cli_integration_tests.rs
use assert_cmd::Command;
use predicates::prelude::*;

fn cmdfilter() -> Command {
    Command::cargo_bin("cmdfilter").unwrap()
}

#[test]
fn test_no_arguments_is_usage_error() {
    cmdfilter()
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("Error initializing: no command specified"))
        .stderr(predicate::str::contains("PATTERNS:"));
}

#[test]
fn test_help_exits_zero_on_stderr() {
    for flag in ["-h", "--help"] {
        cmdfilter()
            .arg(flag)
            .assert()
            .success()
            .stdout("")
            .stderr(predicate::str::contains("--invert-match"))
            .stderr(predicate::str::contains("no-content"));
    }
}

#[test]
fn test_no_patterns_prints_nothing() {
    cmdfilter()
        .args(["echo", "hello world"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_no_patterns_inverted_prints_everything() {
    cmdfilter()
        .args(["-v", "echo", "hello", "world"])
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn test_matching_pattern() {
    cmdfilter()
        .args(["-p", "hello*", "echo", "hello world"])
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn test_non_matching_pattern() {
    cmdfilter()
        .args(["-p", "foo*", "echo", "hello world"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_invert_match() {
    cmdfilter()
        .args(["-p", "hello*", "-v", "echo", "hello world"])
        .assert()
        .success()
        .stdout("");

    cmdfilter()
        .args(["--pattern", "foo*", "--invert-match", "echo", "hello world"])
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn test_escaped_asterisk() {
    cmdfilter()
        .args(["-p", "hello**world", "printf", "hello*world\\nhelloworld\\nhello big world\\n"])
        .assert()
        .success()
        .stdout("hello*world\n");

    cmdfilter()
        .args(["-p", "a***b", "printf", "a*b\\nab\\na*xb\\n"])
        .assert()
        .success()
        .stdout("a*b\na*xb\n");
}

#[test]
fn test_multiple_patterns_any_of() {
    cmdfilter()
        .args(["-p", "*1", "-p", "*3"])
        .args(["sh", "-c", "for i in 1 2 3 4; do echo line$i; done"])
        .assert()
        .success()
        .stdout("line1\nline3\n");
}

#[test]
fn test_command_flags_are_not_ours() {
    // -n belongs to echo, -v to the command line after it
    cmdfilter()
        .args(["-v", "echo", "-n", "-v"])
        .assert()
        .success()
        .stdout("-v\n");
}

#[test]
fn test_double_dash() {
    cmdfilter()
        .args(["-v", "--", "echo", "-p"])
        .assert()
        .success()
        .stdout("-p\n");
}

#[test]
fn test_invalid_command() {
    cmdfilter()
        .arg("command_that_does_not_exist_12345")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Error running command"))
        .stderr(predicate::str::contains("command_that_does_not_exist_12345"));
}

#[test]
fn test_invalid_error_mode() {
    cmdfilter()
        .args(["-e", "bogus", "echo", "hello"])
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("bogus"));
}

#[test]
fn test_unknown_flag_is_usage_error() {
    cmdfilter()
        .args(["--no-such-flag", "echo", "hello"])
        .assert()
        .code(2)
        .stdout("");
}

#[test]
fn test_child_exit_code_is_preserved() {
    cmdfilter()
        .args(["-v", "sh", "-c", "echo out; exit 3"])
        .assert()
        .code(3)
        .stdout("out\n")
        .stderr("");
}

#[test]
fn test_carriage_returns_are_dropped() {
    cmdfilter()
        .args(["-p", "dos", "printf", "dos\\r\\nunix\\n"])
        .assert()
        .success()
        .stdout("dos\n");
}

#[test]
fn test_unterminated_last_line() {
    cmdfilter()
        .args(["-v", "printf", "one\\ntwo"])
        .assert()
        .success()
        .stdout("one\ntwo\n");
}

#[test]
fn test_debug_logs_to_stderr_only() {
    cmdfilter()
        .args(["--debug", "-p", "hello*", "echo", "hello world"])
        .env_remove("CMDFILTER_LOG")
        .assert()
        .success()
        .stdout("hello world\n")
        .stderr(predicate::str::contains("spawned command"));
}

#[test]
fn test_invalid_log_filter_is_usage_error() {
    cmdfilter()
        .args(["-v", "echo", "hi"])
        .env("CMDFILTER_LOG", "cmdfilter=loudest")
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("invalid CMDFILTER_LOG filter"));
}

#[test]
fn test_same_run_twice_is_identical() {
    let run = || {
        cmdfilter()
            .args(["-p", "a*", "printf", "a\\nb\\nab\\nba\\n"])
            .output()
            .unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first.stdout, b"a\nab\n");
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(first.status.code(), second.status.code());
}
