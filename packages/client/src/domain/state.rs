//! Result of an asynchronous operation as seen by its consumers.

use crate::error::ApiError;

/// Tagged state of an asynchronous request.
///
/// Consumers must handle all three variants; there is no "empty" state that
/// could be confused with a successful empty result.
#[derive(Debug, Clone, PartialEq)]
pub enum State<T, E = ApiError> {
    Loading,
    Success(T),
    Failure(E),
}

impl<T, E> State<T, E> {
    pub fn is_loading(&self) -> bool {
        matches!(self, State::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            State::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> State<U, E> {
        match self {
            State::Loading => State::Loading,
            State::Success(value) => State::Success(f(value)),
            State::Failure(error) => State::Failure(error),
        }
    }
}

impl<T, E> From<Result<T, E>> for State<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => State::Success(value),
            Err(error) => State::Failure(error),
        }
    }
}
