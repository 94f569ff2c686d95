//! Error formatting and family classification.

use waxwing_foundation::{Error, Family, Position};

#[test]
fn read_family_diagnostics() {
    let position = Position::new("repl", 1, 4);
    let err = Error::OpenList(position.clone());
    assert_eq!(err.family(), Family::Read);
    assert_eq!(format!("{err}"), "repl:1:4: unterminated list");

    let err = Error::OpenString(position);
    assert_eq!(err.family(), Family::Read);
    assert_eq!(format!("{err}"), "repl:1:4: unterminated string");
}

#[test]
fn emit_family_diagnostics() {
    let position = Position::new("repl", 2, 1);
    let err = Error::MissingArgument(position.clone());
    assert_eq!(err.family(), Family::Emit);

    let err = Error::UnknownIdentifier(position, "launch".to_string());
    assert_eq!(err.family(), Family::Emit);
    assert_eq!(format!("{err}"), "repl:2:1: unknown identifier: launch");
}

#[test]
fn eval_family_diagnostics() {
    let err = Error::MissingValue(Position::new("repl", 3, 9));
    assert_eq!(err.family(), Family::Eval);
    assert_eq!(format!("{err}"), "repl:3:9: missing value");
}

#[test]
fn errors_implement_std_error() {
    fn takes_error(_: &dyn std::error::Error) {}
    takes_error(&Error::internal("x"));
}
