//! Domain validation helpers for the Crop Contract Farming Platform

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Validation failures for crop season input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Date window start must precede its end")]
    InvertedDateWindow,
    #[error("Yield cannot be negative")]
    NegativeYield,
    #[error("Step index must be 1 or greater")]
    InvalidStepIndex,
}

/// Validate that a date window is well-ordered when both ends are present
pub fn validate_date_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if start >= end => Err(ValidationError::InvertedDateWindow),
        _ => Ok(()),
    }
}

/// Validate a yield amount in kilograms
pub fn validate_yield(yield_kg: Decimal) -> Result<(), ValidationError> {
    if yield_kg < Decimal::ZERO {
        Err(ValidationError::NegativeYield)
    } else {
        Ok(())
    }
}

/// Validate a progress entry's 1-based ordering hint
pub fn validate_step_index(step_index: i32) -> Result<(), ValidationError> {
    if step_index < 1 {
        Err(ValidationError::InvalidStepIndex)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ordered_window_passes() {
        assert!(validate_date_window(Some(date(2024, 1, 1)), Some(date(2024, 5, 1))).is_ok());
        assert!(validate_date_window(None, Some(date(2024, 5, 1))).is_ok());
        assert!(validate_date_window(None, None).is_ok());
    }

    #[test]
    fn inverted_or_empty_window_fails() {
        assert_eq!(
            validate_date_window(Some(date(2024, 5, 1)), Some(date(2024, 1, 1))),
            Err(ValidationError::InvertedDateWindow)
        );
        assert_eq!(
            validate_date_window(Some(date(2024, 5, 1)), Some(date(2024, 5, 1))),
            Err(ValidationError::InvertedDateWindow)
        );
    }

    #[test]
    fn negative_yield_fails() {
        assert!(validate_yield(Decimal::from(1000)).is_ok());
        assert!(validate_yield(Decimal::ZERO).is_ok());
        assert_eq!(
            validate_yield(Decimal::from(-1)),
            Err(ValidationError::NegativeYield)
        );
    }

    #[test]
    fn step_index_is_one_based() {
        assert!(validate_step_index(1).is_ok());
        assert_eq!(
            validate_step_index(0),
            Err(ValidationError::InvalidStepIndex)
        );
    }
}
