//! E2E tests for interactive binary usage. Lines are piped into the REPL, so no terminal
//! features are exercised.

use predicates::prelude::*;

use assert_cmd::Command;

fn repl_command() -> Command {
    let mut command = Command::cargo_bin("scicalc").expect("CLI binary");
    command
        .env("COLOR", "never")
        .env_remove("SCICALC_LOG")
        .arg("eval")
        .arg("-i");
    command
}

#[test]
fn greeting_and_evaluation() {
    let assert = repl_command().write_stdin("1 + 2\n").assert();
    assert
        .success()
        .stdout(predicate::str::contains("3\n"))
        .stderr(predicate::str::starts_with("scicalc REPL v"));
}

#[test]
fn errors_do_not_end_session() {
    let assert = repl_command()
        .write_stdin("y = 2\nfoo\ny * 3\n")
        .assert();
    assert
        .success()
        .stdout(predicate::str::contains("2\n").and(predicate::str::contains("6\n")))
        .stderr(predicate::str::contains("error[PARSE]: could not find `foo`"));
}

#[test]
fn dump_and_clear_commands() {
    let assert = repl_command()
        .write_stdin("y = 2\nf: x + y\n.dump\n.clear\n.dump\ny\n")
        .assert();
    assert.success().stderr(
        predicate::str::contains("y = 2\nf: x + 2\n")
            .and(predicate::str::contains("could not find `y`")),
    );
}

#[test]
fn unknown_command() {
    let assert = repl_command().write_stdin(".nope\n").assert();
    assert
        .success()
        .stderr(predicate::str::contains("error[CMD]: Unknown command"));
}

#[test]
fn help_command() {
    let assert = repl_command().write_stdin(".help\n").assert();
    assert
        .success()
        .stderr(predicate::str::contains(".clear").and(predicate::str::contains("del y")));
}

#[test]
fn help_lists_builtins() {
    let assert = repl_command().write_stdin(".help\n").assert();
    assert.success().stderr(
        predicate::str::contains("Builtin constants: e, pi")
            .and(predicate::str::contains("Builtin functions: cbrt, ceil, cos,")),
    );
}

#[test]
fn leading_decimal_point_is_not_a_command() {
    let assert = repl_command().write_stdin(".5 + 1\n").assert();
    assert
        .success()
        .stdout(predicate::str::contains("1.5\n"))
        .stderr(predicate::str::contains("error[CMD]").not());
}
