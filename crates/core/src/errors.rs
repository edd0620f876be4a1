use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("field `{0}` must not be blank")]
    BlankField(&'static str),
}
