use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Unknown row: {0}")]
    UnknownRow(String),
    #[error("Duplicate row id: {0}")]
    DuplicateRowId(String),
    #[error("{0} is read-only")]
    ReadOnlyColumn(&'static str),
}

pub type DomainResult<T> = Result<T, DomainError>;
