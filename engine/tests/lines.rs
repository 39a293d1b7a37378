//! Tests evaluating whole lines through the public API.

use assert_matches::assert_matches;

use scicalc_engine::{
    env::Binding, evaluate_line, format_value, parse_line, tokenize, Environment, ErrorKind,
    Expr, TextSpan, TokenKind,
};

fn eval_all(lines: &[&str]) -> (Environment, Vec<Result<f64, ErrorKind>>) {
    let mut env = Environment::new();
    let results = lines
        .iter()
        .map(|line| {
            evaluate_line(&mut env, line).map_err(|errors| {
                let (_, kind) = errors.iter().next().expect("no errors");
                kind.clone()
            })
        })
        .collect();
    (env, results)
}

#[test]
fn arithmetic_without_variables() {
    let cases = [
        ("1 + 2 * 3 - 4", 3.0),
        ("8 / 4 / 2", 1.0),
        ("2^3^2", 64.0),
        ("2 ^ 10 % 1000", 24.0),
        ("-(3 - 5) * 2", 4.0),
        ("1_000 + .5", 1000.5),
        ("1.5e3 * 2e-3", 3.0),
        ("2(3+4)", 14.0),
        ("5! / 4!", 5.0),
    ];
    let mut env = Environment::new();
    for (source, expected) in cases {
        let value = evaluate_line(&mut env, source).unwrap();
        assert!((value - expected).abs() < 1e-12, "{source}: {value}");
    }
}

#[test]
fn builtin_functions() {
    let mut env = Environment::new();
    let cases = [
        ("sin(90)", "1"),
        ("cos(60)", "0.5"),
        ("tan(45)", "1"),
        ("sqrt(2)^2", "2"),
        ("cbrt(27)", "3"),
        ("round(2.5)", "2"),
        ("round(3.5)", "4"),
        ("floor(-1.5)", "-2"),
        ("ceil(1.2)", "2"),
        ("ln(e)", "1"),
        ("cos(90)", "0"),
    ];
    for (source, expected) in cases {
        let value = evaluate_line(&mut env, source).unwrap();
        assert_eq!(format_value(value), expected, "{source}");
    }
}

#[test]
fn special_values_are_not_errors() {
    let mut env = Environment::new();
    assert_eq!(evaluate_line(&mut env, "1 / 0").unwrap(), f64::INFINITY);
    assert!(evaluate_line(&mut env, "0 / 0").unwrap().is_nan());
    assert!(evaluate_line(&mut env, "sqrt(-1)").unwrap().is_nan());
    assert_eq!(evaluate_line(&mut env, "171!").unwrap(), f64::INFINITY);
    assert_eq!(format_value(evaluate_line(&mut env, "-1 / 0").unwrap()), "-inf");
}

#[test]
fn factorials_of_non_naturals() {
    let (_, results) = eval_all(&["3!", "0!", "(-1)!", "2.5!", "(1 / 0)!"]);
    assert_eq!(results[0], Ok(6.0));
    assert_eq!(results[1], Ok(1.0));
    assert_eq!(results[2], Err(ErrorKind::NonNaturalFactorial));
    assert_eq!(results[3], Err(ErrorKind::NonNaturalFactorial));
    // `inf` is equal to its rounding.
    assert_eq!(results[4], Ok(f64::INFINITY));
}

#[test]
fn session_with_variables_and_functions() {
    let (env, results) = eval_all(&[
        "x = 5",
        "x",
        "x = 7",
        "f: x^2 + 1",
        "f(3)",
        "f(x)",
        "del x",
        "x",
        "del pi",
        "pi = 3",
    ]);

    assert_eq!(results[0], Ok(5.0));
    assert_eq!(results[1], Ok(5.0));
    assert_eq!(results[2], Err(ErrorKind::AlreadyExists("x".to_owned())));
    assert_eq!(results[3], Ok(1.0));
    assert_eq!(results[4], Ok(10.0));
    assert_eq!(results[5], Ok(26.0));
    assert_eq!(results[6], Ok(0.0));
    assert_eq!(results[7], Err(ErrorKind::UnknownName("x".to_owned())));
    assert_eq!(results[8], Err(ErrorKind::DeleteConstant));
    assert_eq!(results[9], Err(ErrorKind::AlreadyExists("pi".to_owned())));

    assert_eq!(env.variables().count(), 0);
    let functions: Vec<_> = env.functions().map(|(name, _)| name).collect();
    assert_eq!(functions, ["f"]);
    assert_matches!(env.lookup("f"), Some(Binding::Function(_)));
}

#[test]
fn error_messages() {
    let (_, results) = eval_all(&["x = 5", "x = 7", "del x", "x", "y = 1 +"]);
    let messages: Vec<_> = results
        .into_iter()
        .filter_map(Result::err)
        .map(|kind| kind.to_string())
        .collect();
    assert_eq!(
        messages,
        ["`x` already exists", "could not find `x`", "invalid expression"]
    );
}

#[test]
fn unknown_name_is_reported_once_per_span() {
    let mut env = Environment::new();
    let errors = evaluate_line(&mut env, "foo + bar").unwrap_err();
    // Parsing aborts on the first error.
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors.get(TextSpan::new(0, 3)),
        Some(&ErrorKind::UnknownName("foo".to_owned()))
    );

    let errors = evaluate_line(&mut env, "1 + foo").unwrap_err();
    assert_eq!(errors.len(), 1);
    let message = errors.get(TextSpan::new(4, 7)).map(ToString::to_string);
    assert_eq!(message.as_deref(), Some("could not find `foo`"));
}

#[test]
fn lexer_and_parser_errors_are_combined() {
    let mut env = Environment::new();
    let errors = evaluate_line(&mut env, "1 $ 2").unwrap_err();
    assert_eq!(
        errors.get(TextSpan::new(2, 3)),
        Some(&ErrorKind::UnknownChar('$'))
    );
    assert_eq!(
        errors.get(TextSpan::new(2, 3)).unwrap().to_string(),
        "Unknown character: '$'."
    );
}

#[test]
fn tokens_reproduce_source() {
    let sources = ["y = 1.5e-3 * sin(90)", "del  f", "f: x^2 + 1 ! €", "1.2.3 - 4"];
    for source in sources {
        let tokens = tokenize(source);
        assert_eq!(tokens.last().map(|token| token.kind), Some(TokenKind::Eof));
        let restored: String = tokens.iter().map(|token| token.lexeme).collect();
        assert_eq!(restored, source);
    }
}

#[test]
fn parsed_lines_can_be_printed() {
    let mut env = Environment::new();
    let line = parse_line(&mut env, "y = (2+3)*4");
    assert_eq!(line.expr.to_string(), "y = (2 + 3) * 4");
    let line = parse_line(&mut env, "g: -x^2 + y");
    assert_eq!(line.expr.to_string(), "g: -x ^ 2 + 20");
    assert_matches!(parse_line(&mut env, "del y").expr, Expr::Del(name) if name == "y");
}

#[test]
fn deeply_nested_lines_are_rejected() {
    let line = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
    let (env, results) = eval_all(&[line.as_str(), "y = 2 * 3"]);
    assert_eq!(results, [Err(ErrorKind::TooDeep), Ok(6.0)]);
    assert_eq!(env.variable("y"), Some(6.0));
}
