use predicates::prelude::*;
use unindent::unindent;

use assert_cmd::Command;

fn base_command() -> Command {
    let mut command = Command::cargo_bin("scicalc").expect("CLI binary");
    command
        .env("TERM", "dumb")
        .env("COLOR", "never")
        .env_remove("SCICALC_LOG");
    command
}

fn eval_command(line: &str) -> Command {
    let mut command = base_command();
    command.arg("eval").arg(line);
    command
}

#[test]
fn successful_execution() {
    let assert = eval_command("1 + 2 * 3").assert();
    assert.success().stdout("7\n");
}

#[test]
fn formatting_results() {
    eval_command("1 / 3").assert().success().stdout("0.333333333333333\n");
    eval_command("sin(30)").assert().success().stdout("0.5\n");
    eval_command("1 / 0").assert().success().stdout("inf\n");
    eval_command("2^3^2").assert().success().stdout("64\n");
}

#[test]
fn leading_decimal_point_is_a_number() {
    eval_command(".5 + 1").assert().success().stdout("1.5\n");
    eval_command(".25").assert().success().stdout("0.25\n");
}

#[test]
fn outputting_ast() {
    let assert = base_command().arg("ast").arg("1 + sqrt(4)").assert();
    assert.success().stdout(
        predicate::str::starts_with("Binary {")
            .and(predicate::str::contains("op: Add"))
            .and(predicate::str::contains("name: \"sqrt\"")),
    );
}

#[test]
fn outputting_ast_from_stdin() {
    let assert = base_command().arg("ast").write_stdin("y = 2\n").assert();
    assert
        .success()
        .stdout(predicate::str::starts_with("VarDecl {").and(predicate::str::contains("\"y\"")));
}

#[test]
fn syntax_error() {
    const EXPECTED_ERR: &str = r#"
        error[PARSE]: could not find `foo`
          ┌─ Snip #1:1:5
          │
        1 │ 1 + foo
          │     ^^^ Error occurred here
    "#;

    let assert = eval_command("1 + foo").assert();
    assert
        .failure()
        .code(2)
        .stdout("")
        .stderr(predicate::str::starts_with(unindent(EXPECTED_ERR)));
}

#[test]
fn lexer_error() {
    const EXPECTED_ERR: &str = r#"
        error[LEX]: Unknown character: '$'.
          ┌─ Snip #1:1:3
          │
        1 │ 1 $ 2
          │   ^ Error occurred here
    "#;

    let assert = eval_command("1 $ 2").assert();
    assert
        .failure()
        .code(2)
        .stderr(predicate::str::starts_with(unindent(EXPECTED_ERR)));
}

#[test]
fn error_in_ast_command() {
    let assert = base_command().arg("ast").arg("(1 + 2").assert();
    assert
        .failure()
        .code(2)
        .stderr(predicate::str::starts_with("error[PARSE]: expected ')'"));
}

#[test]
fn evaluating_lines_from_stdin() {
    let assert = base_command()
        .arg("eval")
        .write_stdin("x = 5\nf: x^2 + 1\n\nf(x)\ndel x\n")
        .assert();
    assert.success().stdout("5\n1\n26\n0\n");
}

#[test]
fn piped_lines_with_leading_decimal_point() {
    let assert = base_command()
        .arg("eval")
        .write_stdin(".5 * 4\ny = .75\n")
        .assert();
    assert.success().stdout("2\n0.75\n");
}

#[test]
fn stopping_on_first_error_in_stdin() {
    const EXPECTED_ERR: &str = r#"
        error[PARSE]: `x` already exists
          ┌─ Snip #2:1:1
          │
        1 │ x = 7
          │ ^ Error occurred here
    "#;

    let assert = base_command()
        .arg("eval")
        .write_stdin("x = 5\nx = 7\nx\n")
        .assert();
    assert
        .failure()
        .code(2)
        .stdout("5\n")
        .stderr(predicate::str::starts_with(unindent(EXPECTED_ERR)));
}

#[test]
fn invalid_args() {
    let assert = base_command().arg("--color").arg("purple").arg("eval").assert();
    assert.failure().code(1);

    let assert = base_command().arg("eval").arg("-i").arg("1").assert();
    assert.failure().code(1);
}

#[test]
fn help() {
    let assert = base_command().arg("--help").assert();
    assert
        .success()
        .stdout(predicate::str::contains("EXIT CODES:"));
}
