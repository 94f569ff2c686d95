//! Reader grammar and diagnostics.

use waxwing_foundation::{Error, Family};
use waxwing_language::{Form, Types, read};

#[test]
fn reads_a_program_of_mixed_forms() {
    let types = Types::new();
    let forms = read("test", "(function inc (n) (+ n 1)) (inc 41) \"done\"", &types).unwrap();
    assert_eq!(forms.len(), 3);
    assert!(matches!(&forms[0], Form::List { items, .. } if items.len() == 4));
    assert!(matches!(&forms[2], Form::Literal { value, .. } if value.as_str() == Some("done")));
}

#[test]
fn minus_prefixed_names_are_identifiers() {
    let types = Types::new();
    let forms = read("test", "-n -5 --", &types).unwrap();
    assert!(matches!(&forms[0], Form::Identifier { name, .. } if name == "-n"));
    assert!(matches!(&forms[1], Form::Literal { value, .. } if value.as_int() == Some(-5)));
    assert!(matches!(&forms[2], Form::Identifier { name, .. } if name == "--"));
}

#[test]
fn strings_span_until_the_next_quote() {
    let types = Types::new();
    let forms = read("test", "\"(not a list)\"", &types).unwrap();
    assert!(
        matches!(&forms[0], Form::Literal { value, .. } if value.as_str() == Some("(not a list)"))
    );
}

#[test]
fn read_errors_classify_into_the_read_family() {
    let types = Types::new();
    assert_eq!(
        read("test", "(", &types).unwrap_err().family(),
        Family::Read
    );
    assert_eq!(
        read("test", "\"open", &types).unwrap_err().family(),
        Family::Read
    );
}

#[test]
fn open_list_position_points_at_the_paren() {
    let types = Types::new();
    let err = read("test", "  (1 2", &types).unwrap_err();
    let Error::OpenList(position) = err else {
        panic!("expected OpenList");
    };
    assert_eq!(position.line(), 1);
    assert_eq!(position.column(), 3);
}

#[test]
fn list_positions_nest() {
    let types = Types::new();
    let forms = read("test", "(a (b))", &types).unwrap();
    let Form::List { items, position } = &forms[0] else {
        panic!("expected list");
    };
    assert_eq!(position.column(), 1);
    let Form::List { position, .. } = &items[1] else {
        panic!("expected nested list");
    };
    assert_eq!(position.column(), 4);
}
