use std::error::Error;
use std::fmt;

use step_rail::{step_error, Chain, MessageError, NoValue, Step, StepError};

use crate::types::{divide, DivisionByZero};

#[derive(Debug)]
struct ConfigError {
    source: std::num::ParseIntError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid config value")
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

fn config_error() -> StepError {
    let source = "x".parse::<u16>().unwrap_err();
    StepError::new(ConfigError { source })
}

#[test]
fn is_and_downcast_ref_check_concrete_type() {
    let err = StepError::new(DivisionByZero { dividend: 3 });

    assert!(err.is::<DivisionByZero>());
    assert!(!err.is::<MessageError>());
    assert_eq!(err.downcast_ref::<DivisionByZero>().map(|e| e.dividend), Some(3));
    assert!(err.downcast_ref::<MessageError>().is_none());
}

#[test]
fn downcast_to_wrong_type_returns_error_unchanged() {
    let err = StepError::new(DivisionByZero { dividend: 3 });
    let err = err.downcast::<MessageError>().unwrap_err();

    assert_eq!(err.downcast::<DivisionByZero>().unwrap(), DivisionByZero { dividend: 3 });
}

#[test]
fn downcast_of_shared_error_keeps_it_shared() {
    let result = Chain::of(3).map(|_| Err::<i32, _>(step_error!("boom"))).get_result();
    let (outcome, history) = result.into_parts();

    let err = outcome.unwrap_err().downcast::<MessageError>().unwrap_err();
    assert!(err.ptr_eq(history.as_step().error().unwrap()));
}

#[test]
fn downcast_takes_ownership_once_history_is_gone() {
    let failing = Chain::of(3).map(|n| divide(*n, 0));
    let result = failing.get_result();
    let (outcome, history) = result.into_parts();

    let err = outcome.unwrap_err().downcast::<DivisionByZero>().unwrap_err();
    assert!(err.ptr_eq(history.as_step().error().unwrap()));
    assert_eq!(err.to_string(), "cannot divide 3 by zero");

    drop(history);
    assert_eq!(err.downcast::<DivisionByZero>().unwrap(), DivisionByZero { dividend: 3 });
}

#[test]
fn display_and_debug_delegate_to_captured_error() {
    let err = StepError::new(DivisionByZero { dividend: 9 });

    assert_eq!(err.to_string(), "cannot divide 9 by zero");
    assert_eq!(format!("{:?}", err), "DivisionByZero { dividend: 9 }");
}

#[test]
fn source_and_chain_walk_causes() {
    let err = config_error();

    assert!(err.source().is_some());
    let messages: Vec<String> = err.chain().map(ToString::to_string).collect();
    assert_eq!(messages, ["invalid config value", "invalid digit found in string"]);
}

#[test]
fn chain_of_error_without_source_has_one_entry() {
    let err = step_error!("disk full");

    assert!(err.source().is_none());
    assert_eq!(err.chain().count(), 1);
}

#[test]
fn boxed_conversion_keeps_message_and_source() {
    let boxed: Box<dyn Error + Send + Sync> = config_error().into();

    assert_eq!(boxed.to_string(), "invalid config value");
    assert!(boxed.source().is_some());
}

#[test]
fn question_mark_converts_into_step_error() {
    fn parse(raw: &str) -> step_rail::StepResult<u16> {
        Ok(raw.parse::<u16>()?)
    }

    assert!(parse("12x").unwrap_err().is::<std::num::ParseIntError>());
}

#[test]
fn message_errors_expose_text() {
    let err = StepError::msg(String::from("owned message"));
    assert_eq!(err.downcast_ref::<MessageError>().unwrap().message(), "owned message");
}

#[test]
fn no_value_names_last_step() {
    let err = Chain::of(1).filter_safe(|_| false).get().unwrap_err();
    let no_value = err.downcast_ref::<NoValue>().unwrap();

    assert!(err.to_string().starts_with("chain produced no value (last step at "));
    assert!(err.to_string().contains(&no_value.call_site().to_string()));
}
