use std::cell::{Cell, RefCell};

use step_rail::{step_error, Chain, ChainResult, MessageError, NoValue, Step, StepError};

use crate::types::{divide, DivisionByZero, Escalated};

fn failing() -> ChainResult<i32> {
    Chain::of(5).map(|n| divide(*n, 0)).get_result()
}

fn empty() -> ChainResult<i32> {
    Chain::of(5).filter_safe(|n| *n > 10).get_result()
}

#[test]
fn get_distinguishes_value_absence_and_failure() {
    assert_eq!(Chain::of(5).get_result().get().unwrap(), 5);
    assert!(empty().get().unwrap_err().is::<NoValue>());
    assert!(failing().get().unwrap_err().is::<DivisionByZero>());
}

#[test]
fn get_option_keeps_absence_as_none() {
    assert_eq!(Chain::of(5).get_result().get_option().unwrap(), Some(5));
    assert_eq!(empty().get_option().unwrap(), None);
    assert!(failing().get_option().is_err());
}

#[test]
fn no_value_points_at_last_step() {
    let err = empty().get().unwrap_err();
    let no_value = err.downcast_ref::<NoValue>().unwrap();
    assert_eq!(no_value.call_site().file(), file!());
}

#[test]
fn into_parts_splits_outcome_and_history() {
    let (outcome, history) = failing().into_parts();
    assert!(outcome.is_err());
    assert!(history.as_step().is_error());

    let (outcome, history) = Chain::of(1).get_result().into_parts();
    assert_eq!(outcome.unwrap().as_deref(), Some(&1));
    assert_eq!(history.value(), Some(&1));
}

#[test]
fn get_or_spec_error_returns_original_error_of_requested_kind() {
    let mapped = Cell::new(false);
    let err = failing()
        .get_or_spec_error::<DivisionByZero, _>(|_| {
            mapped.set(true);
            DivisionByZero { dividend: -1 }
        })
        .unwrap_err();

    assert_eq!(err, DivisionByZero { dividend: 5 });
    assert!(!mapped.get());
}

#[test]
fn get_or_spec_error_maps_other_errors() {
    let err = failing()
        .get_or_spec_error::<Escalated, _>(|err| {
            assert!(err.is::<DivisionByZero>());
            Escalated(err.to_string())
        })
        .unwrap_err();

    assert_eq!(err, Escalated("cannot divide 5 by zero".into()));
}

#[test]
fn get_or_spec_error_returns_value_on_success() {
    let value = Chain::of(3).get_result().get_or_spec_error::<Escalated, _>(|_| unreachable!());
    assert_eq!(value.unwrap(), 3);
}

#[test]
fn get_or_spec_error_escalates_absence_as_no_value() {
    let err = empty().get_or_spec_error::<NoValue, _>(|_| unreachable!()).unwrap_err();
    assert_eq!(err.call_site().file(), file!());

    let err = empty()
        .get_or_spec_error::<Escalated, _>(|err| {
            assert!(err.is::<NoValue>());
            Escalated("empty".into())
        })
        .unwrap_err();
    assert_eq!(err.0, "empty");
}

#[test]
fn get_option_or_spec_error_keeps_absence() {
    assert_eq!(empty().get_option_or_spec_error::<Escalated, _>(|_| unreachable!()).unwrap(), None);

    let err =
        failing().get_option_or_spec_error::<DivisionByZero, _>(|_| unreachable!()).unwrap_err();
    assert_eq!(err.dividend, 5);
}

#[test]
fn get_or_spec_error_by_sees_whole_result() {
    let err = failing()
        .get_or_spec_error_by::<Escalated, _>(|result| {
            Escalated(format!("failed after {} steps", result.history().depth()))
        })
        .unwrap_err();
    assert_eq!(err.0, "failed after 2 steps");

    let err = failing().get_or_spec_error_by::<DivisionByZero, _>(|_| unreachable!()).unwrap_err();
    assert_eq!(err.dividend, 5);
}

#[test]
fn get_or_spec_error_by_handles_absence() {
    let err = empty()
        .get_or_spec_error_by::<Escalated, _>(|result| {
            assert!(result.is_success());
            Escalated("nothing".into())
        })
        .unwrap_err();
    assert_eq!(err.0, "nothing");

    let escalated = empty().get_option_or_spec_error_by::<Escalated, _>(|_| unreachable!());
    assert_eq!(escalated.unwrap(), None);
}

#[test]
fn escalating_message_errors() {
    let err = Chain::of(1)
        .map(|_| Err::<i32, _>(StepError::msg("invalid tenant")))
        .get_or_spec_error::<MessageError, _>(|_| unreachable!())
        .unwrap_err();

    assert_eq!(err.message(), "invalid tenant");
}

#[test]
fn get_or_fallback_for_error_never_fails() {
    assert_eq!(failing().get_or_fallback_for_error(|_| -1), Some(-1));
    assert_eq!(Chain::of(2).get_result().get_or_fallback_for_error(|_| -1), Some(2));
    assert_eq!(empty().get_or_fallback_for_error(|_| -1), None);
}

#[test]
fn get_option_even_err_maps_failure_to_option() {
    assert_eq!(failing().get_option_even_err(|_| None), None);
    assert_eq!(failing().get_option_even_err(|_| Some(0)), Some(0));
    assert_eq!(Chain::of(4).get_result().get_option_even_err(|_| None), Some(4));
}

#[test]
fn if_error_runs_only_on_failure() {
    let calls = Cell::new(0);
    failing().if_error(|_| calls.set(calls.get() + 1));
    Chain::of(1).get_result().if_error(|_| calls.set(calls.get() + 1));
    assert_eq!(calls.get(), 1);
}

#[test]
fn do_if_error_returns_result_for_chaining() {
    let seen = RefCell::new(String::new());
    let result = failing().do_if_error(|err| seen.borrow_mut().push_str(&err.to_string()));

    assert!(result.is_failure());
    assert_eq!(seen.borrow().as_str(), "cannot divide 5 by zero");
}

#[test]
fn do_if_runs_observer_when_predicate_holds() {
    let hits = Cell::new(0);
    let result = Chain::of(8)
        .get_result()
        .do_if(|r| r.value().is_some_and(|v| *v > 5), |_| hits.set(hits.get() + 1))
        .do_if(|r| r.is_failure(), |_| hits.set(hits.get() + 10));

    assert_eq!(hits.get(), 1);
    assert_eq!(result.value(), Some(&8));
}

#[test]
fn map_error_keeps_history() {
    let result = failing().map_error(|err| Escalated(err.to_string()));

    assert_eq!(result.error(), Some(&Escalated("cannot divide 5 by zero".into())));
    let node_error = result.history().as_step().error().unwrap();
    assert!(node_error.is::<DivisionByZero>());
}

#[test]
fn map_error_leaves_success_alone() {
    let result = Chain::of(1).get_result().map_error(|_| "unused");
    assert_eq!(result.value(), Some(&1));
}

#[test]
fn trace_debug_or_error_picks_sink_by_outcome() {
    let debug = RefCell::new(Vec::new());
    let error = RefCell::new(Vec::new());
    let record = |sink: &RefCell<Vec<String>>, text: &str| {
        sink.borrow_mut().push(text.to_owned());
        Ok(())
    };

    let _ = Chain::of(1).get_result().trace_debug_or_error(
        true,
        |text| record(&debug, text),
        true,
        |text| record(&error, text),
    );
    let _ = failing().trace_debug_or_error(
        true,
        |text| record(&debug, text),
        true,
        |text| record(&error, text),
    );

    assert_eq!(debug.borrow().len(), 1);
    assert_eq!(error.borrow().len(), 1);
    assert!(error.borrow()[0].contains("cannot divide 5 by zero"));
}

#[test]
fn trace_debug_or_error_respects_flags() {
    let calls = Cell::new(0);
    let _ = Chain::of(1).get_result().trace_debug_or_error(
        false,
        |_| {
            calls.set(calls.get() + 1);
            Ok(())
        },
        true,
        |_| Ok(()),
    );
    let _ = failing().trace_debug_or_error(
        true,
        |_| Ok(()),
        false,
        |_| {
            calls.set(calls.get() + 1);
            Ok(())
        },
    );

    assert_eq!(calls.get(), 0);
}

#[test]
fn failing_sink_does_not_change_result() {
    let result = failing();
    let traced =
        result.trace_debug_or_error(false, |_| Ok(()), true, |_| Err(step_error!("sink offline")));

    assert!(traced.is_failure());
    assert!(traced.error().unwrap().is::<DivisionByZero>());
}

#[test]
fn trace_returns_same_result() {
    let result = failing();
    assert!(result.trace().is_failure());
    assert!(Chain::of(1).get_result().trace().is_success());
}
