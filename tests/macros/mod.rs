use step_rail::{bail_step, step_error, Chain, MessageError, StepResult};

#[test]
fn step_error_formats_message() {
    let id = 42;
    let err = step_error!("order {} not found", id);

    assert!(err.is::<MessageError>());
    assert_eq!(err.to_string(), "order 42 not found");
}

#[test]
fn step_error_accepts_inline_arguments() {
    let table = "users";
    let err = step_error!("table {table} is locked");
    assert_eq!(err.to_string(), "table users is locked");
}

#[test]
fn bail_step_returns_early_from_helper() {
    fn positive(n: i32) -> StepResult<i32> {
        if n <= 0 {
            bail_step!("expected a positive number, got {}", n);
        }
        Ok(n)
    }

    assert_eq!(positive(3).unwrap(), 3);
    assert_eq!(positive(-1).unwrap_err().to_string(), "expected a positive number, got -1");
}

#[test]
fn bail_step_inside_step_closure() {
    let chain = Chain::of(vec![1, 2, 3]).map(|items| {
        if items.len() > 2 {
            bail_step!("batch too large: {}", items.len());
        }
        Ok(items.len())
    });

    let result = chain.get_result();
    assert_eq!(result.error().unwrap().to_string(), "batch too large: 3");
}
