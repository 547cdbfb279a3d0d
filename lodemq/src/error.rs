use std::fmt;

use lodemq_codec::frame::{self, ErrorKind, Frame, Reply};

/// The own result type where the error part is a async friendly error.
pub type Result<T> = std::result::Result<T, Error>;

/// Shorthand of a boxed Send, Sync error.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// An error which is reported to the client as an error line. The connection remains usable
/// after that.
#[derive(Debug, PartialEq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub text: String,
}

impl From<RuntimeError> for Reply {
    fn from(err: RuntimeError) -> Reply {
        frame::error(err.kind, &err.text)
    }
}

impl From<RuntimeError> for Frame {
    fn from(value: RuntimeError) -> Self {
        Frame::Frame(value.into())
    }
}

impl<T> From<RuntimeError> for Result<T> {
    fn from(value: RuntimeError) -> Self {
        Err(Box::new(value))
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.text)
    }
}

impl std::error::Error for RuntimeError {}

/// Errors of the queue store.
#[derive(Debug, PartialEq)]
pub enum StoreError {
    /// There is no queue with that name.
    NotFound(String),
    /// The queue has been deleted while someone was still using it.
    Closed(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(name) => write!(f, "Queue {name} not found"),
            StoreError::Closed(name) => write!(f, "Queue {name} is closed"),
        }
    }
}

impl std::error::Error for StoreError {}

impl<T> From<StoreError> for Result<T> {
    fn from(value: StoreError) -> Self {
        Err(Box::new(value))
    }
}

fn runtime_error<T>(kind: ErrorKind, text: &str) -> Result<T> {
    RuntimeError {
        kind,
        text: text.to_owned(),
    }
    .into()
}

/// The client did something which is not allowed in the current state.
pub fn client_error<T>(text: &str) -> Result<T> {
    runtime_error(ErrorKind::ClientError, text)
}

/// The server couldn't serve the request.
pub fn server_error<T>(text: &str) -> Result<T> {
    runtime_error(ErrorKind::ServerError, text)
}

/// Unknown command or subcommand, reported as a bare `ERROR`.
pub fn protocol_error<T>(text: &str) -> Result<T> {
    runtime_error(ErrorKind::Error, text)
}

/// Splits out the errors which can be reported to the client. Other errors are internal errors,
/// the connection cannot continue after them.
pub fn to_runtime_error(err: Error) -> std::result::Result<RuntimeError, Error> {
    err.downcast::<RuntimeError>().map(|rte| *rte)
}
