use step_rail::convert::*;
use step_rail::{step_error, Chain, NoValue, StepError};

use crate::types::DivisionByZero;

#[test]
fn chain_result_to_result_handles_all_outcomes() {
    assert_eq!(chain_result_to_result(Chain::of(2).get_result()).unwrap(), 2);

    let empty = chain_result_to_result(Chain::of(2).filter_safe(|_| false).get_result());
    assert!(empty.unwrap_err().is::<NoValue>());

    let failing = Chain::of(2).map(|_| Err::<i32, _>(step_error!("nope")));
    let failed = chain_result_to_result(failing.get_result());
    assert_eq!(failed.unwrap_err().to_string(), "nope");
}

#[test]
fn result_to_chain_starts_lazily_from_value_or_error() {
    let ok = result_to_chain(Ok::<_, DivisionByZero>(5)).map_safe(|n| n * 2);
    assert_eq!(ok.get().unwrap(), 10);

    let failed = result_to_chain(Err::<i32, _>(DivisionByZero { dividend: 5 }));
    assert!(failed.get().unwrap_err().is::<DivisionByZero>());
    assert!(failed.get().unwrap_err().is::<DivisionByZero>());
}

#[test]
fn option_to_chain_starts_empty_on_none() {
    assert_eq!(option_to_chain(Some(1)).get().unwrap(), 1);
    assert_eq!(option_to_chain(None::<i32>).get_option().unwrap(), None);
}

#[test]
fn chain_result_into_result_of_option() {
    let present: Result<Option<i32>, StepError> = Chain::of(7).get_result().into();
    assert_eq!(present.unwrap(), Some(7));

    let mapped: Result<Option<i32>, String> = Chain::of(7)
        .map(|_| Err::<i32, _>(step_error!("gone")))
        .get_result_mapped(|err| err.to_string())
        .into();
    assert_eq!(mapped.unwrap_err(), "gone");
}

#[test]
fn step_error_to_boxed_works_with_question_mark() {
    fn run() -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        let value =
            Chain::of("x").map(|s| Ok(s.parse::<i32>()?)).get().map_err(step_error_to_boxed)?;
        Ok(value)
    }

    assert!(run().unwrap_err().to_string().contains("invalid digit"));
}
