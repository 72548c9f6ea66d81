use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{field} must be non-negative, got {value}")]
    NegativeQuantity { field: &'static str, value: i64 },
    #[error("price must be non-negative, got {0}")]
    NegativePrice(String),
    #[error("unknown employee category `{0}` (expected Garden|DIY|Construction|Tools)")]
    UnknownCategory(String),
    #[error("unknown request status `{0}` (expected pending|picked|in_transit|delivered)")]
    UnknownRequestStatus(String),
    #[error("{0} must not be blank")]
    BlankField(&'static str),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}
