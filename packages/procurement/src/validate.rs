//! Schema validation for stage boundaries.
//!
//! Schemas are compile-time structures: each record type implements
//! [`Validate`] and is checked before it crosses a stage boundary.
//! Validation is all-or-nothing per record. Batch aggregates drop failing
//! records instead of failing the whole batch; whole-stage inputs (the job,
//! the query set) fail their stage on any violation.

use crate::error::ValidationError;

/// A record that can be checked against its declared schema.
pub trait Validate {
    /// Check every declared constraint, naming the offending field on
    /// violation.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Require a non-empty string field.
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

/// Require a numeric field to sit within `[min, max]`.
pub(crate) fn require_range<T>(field: &str, value: T, min: T, max: T) -> Result<(), ValidationError>
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    if value < min || value > max {
        return Err(ValidationError::new(
            field,
            format!("must be within [{min}, {max}], got {value}"),
        ));
    }
    Ok(())
}

/// Require a numeric field to be at least `min`.
pub(crate) fn require_min(field: &str, value: usize, min: usize) -> Result<(), ValidationError> {
    if value < min {
        return Err(ValidationError::new(
            field,
            format!("must be at least {min}, got {value}"),
        ));
    }
    Ok(())
}

/// Require a list length within `[min, max]`.
pub(crate) fn require_len(
    field: &str,
    len: usize,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    if len < min || len > max {
        return Err(ValidationError::new(
            field,
            format!("length must be within [{min}, {max}], got {len}"),
        ));
    }
    Ok(())
}

/// Keep only records that pass validation, logging each drop.
pub fn retain_valid<T: Validate>(items: Vec<T>, what: &str) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| match item.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(record = what, error = %e, "dropping record that failed validation");
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bounded(u32);

    impl Validate for Bounded {
        fn validate(&self) -> Result<(), ValidationError> {
            require_range("value", self.0, 1, 5)
        }
    }

    #[test]
    fn range_violation_names_field_and_bounds() {
        let err = require_range("score", 1.5, 0.0, 1.0).unwrap_err();
        assert_eq!(err.field, "score");
        assert!(err.constraint.contains("[0, 1]"));
    }

    #[test]
    fn retain_valid_drops_only_failing_records() {
        let kept = retain_valid(vec![Bounded(1), Bounded(9), Bounded(5)], "bounded");
        assert_eq!(kept.len(), 2);
    }
}
