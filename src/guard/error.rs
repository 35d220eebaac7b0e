use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("token could not be parsed from the request")]
    TokenMissing,
    #[error("user not defined")]
    UserNotDefined,
}
