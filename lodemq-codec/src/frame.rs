//! Requests and replies of the text protocol.
//!
//! A request is a single line tokenized on whitespace, the first token being the command name.
//! Replies are the memcache-style lines a server sends back: data blocks, stat lines, the
//! terminator and the classified error lines.
use bytes::Bytes;
use std::fmt;

pub const VALUE: &str = "VALUE";
pub const STAT: &str = "STAT";
pub const VERSION: &str = "VERSION";
pub const END: &str = "END";

/// Request line sent by a client, like `GET work/open`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Request {
    pub args: Vec<String>,
}

impl Request {
    /// The command name, the first token of the line.
    pub fn command(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Request {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Request {
            args: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Classes of error lines. The class is the first token of the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown command or malformed request, the bare `ERROR`.
    Error,
    /// The client violated the protocol, `CLIENT_ERROR`.
    ClientError,
    /// The server or the storage failed to serve the request, `SERVER_ERROR`.
    ServerError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Error => "ERROR",
            ErrorKind::ClientError => "CLIENT_ERROR",
            ErrorKind::ServerError => "SERVER_ERROR",
        }
    }

    pub fn from_token(token: &str) -> Option<ErrorKind> {
        match token {
            "ERROR" => Some(ErrorKind::Error),
            "CLIENT_ERROR" => Some(ErrorKind::ClientError),
            "SERVER_ERROR" => Some(ErrorKind::ServerError),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// A data block: `VALUE <key> 0 <len>` followed by the payload.
    Value { key: String, data: Bytes },
    /// A single `STAT <name> <value>` line.
    Stat { name: String, value: String },
    Version(String),
    /// The terminator of a successful command.
    End,
    Error(ErrorKind, String),
}

/// What the server writes out as the response of one command. Multiple replies are encoded into
/// the same buffer, so they are flushed together.
#[derive(Debug)]
pub enum Frame {
    Frame(Reply),
    Frames(Vec<Reply>),
}

pub fn value(key: &str, data: Bytes) -> Reply {
    Reply::Value {
        key: key.to_owned(),
        data,
    }
}

pub fn stat<V: ToString>(name: &str, value: V) -> Reply {
    Reply::Stat {
        name: name.to_owned(),
        value: value.to_string(),
    }
}

pub fn error(kind: ErrorKind, text: &str) -> Reply {
    Reply::Error(kind, text.to_owned())
}
