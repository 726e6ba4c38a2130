use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DualplexError {
    #[error("invalid lp: {0}")]
    InvalidLp(String),

    #[error("invalid basis: {0}")]
    InvalidBasis(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}
