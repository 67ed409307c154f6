use thiserror::Error;

pub type PlannerResult<T> = Result<T, PlannerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// The main/accent selection for a woven pattern cannot be honored.
    #[error("cannot compute {pattern} pattern: {reason}")]
    InvalidSelection { pattern: String, reason: String },

    #[error("invalid {field}: {value} (must be a finite, non-negative number)")]
    InvalidDimension { field: String, value: f64 },

    #[error("{what} would need {count} entries, more than the limit of {limit}")]
    TooLarge { what: String, count: u64, limit: u64 },
}

/// Rejects negative or non-finite measurements. Zero is allowed; the
/// engines treat it as infeasible rather than invalid.
pub fn check_dimension(field: &str, value: f64) -> PlannerResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PlannerError::InvalidDimension {
            field: field.to_string(),
            value,
        })
    }
}
