use std::error::Error;
use std::fmt;

use step_rail::StepResult;

pub mod chain_result;
pub mod formatting;
pub mod report;
pub mod step_error;

/// Domain error used across the chain tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisionByZero {
    pub dividend: i32,
}

impl fmt::Display for DivisionByZero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot divide {} by zero", self.dividend)
    }
}

impl Error for DivisionByZero {}

pub fn divide(dividend: i32, divisor: i32) -> StepResult<i32> {
    if divisor == 0 {
        return Err(DivisionByZero { dividend }.into());
    }
    Ok(dividend / divisor)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escalated(pub String);

impl fmt::Display for Escalated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "escalated: {}", self.0)
    }
}

impl Error for Escalated {}
