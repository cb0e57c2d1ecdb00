use crate::pattern::PatternError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("route registration for pattern {pattern:?} was called with zero handlers")]
    EmptyHandlerList { pattern: String },
}

pub type RouterResult<T> = Result<T, RouterError>;
