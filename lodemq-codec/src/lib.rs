//! Data structures and codecs for the LodeMQ line-oriented text protocol.
//!
//! The request and reply types are in the `frame` module, the `codec` implements
//! the encoding and the decoding for both the server and the client side.
pub mod codec;
pub mod frame;

#[cfg(test)]
mod tests;

use std::fmt;

/// Error struct used by the crate.
#[derive(Debug)]
pub struct FrameError {
    pub message: String,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame error: {}", self.message)
    }
}

impl std::error::Error for FrameError {}

impl From<FrameError> for std::io::Error {
    fn from(err: FrameError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, err)
    }
}

/// Shorthand for making frame errors wrapped in an `io::Error`, the error type the codecs use.
///
/// ```no_run
/// use lodemq_codec::frame_error;
///
/// fn header(line: &str) -> Result<&str, std::io::Error> {
///     match line.strip_prefix("VALUE ") {
///         Some(rest) => Ok(rest),
///         None => frame_error!("Not a value header"),
///     }
/// }
/// ```
#[macro_export]
macro_rules! frame_error {
    ($message:expr) => {
        ::std::result::Result::Err(::std::io::Error::from($crate::FrameError {
            message: ::std::string::String::from($message),
        }))
    };
}
