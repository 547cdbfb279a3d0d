//! Parsing of the `GET` command line.
//!
//! ```text
//! GET <queue>[:<consumer-group>][/<subcommand>][t=<seconds>/]
//! ```
use crate::error::protocol_error;
use crate::Result;
use std::fmt;

const TIMEOUT_MARKER: &str = "t=";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubCommand {
    /// Empty subcommand or `open`.
    Open,
    Close,
    CloseOpen,
    Abort,
    Peek,
    Invalid(String),
}

impl From<&str> for SubCommand {
    fn from(value: &str) -> Self {
        match value {
            "" | "open" => SubCommand::Open,
            "close" => SubCommand::Close,
            "close/open" => SubCommand::CloseOpen,
            "abort" => SubCommand::Abort,
            "peek" => SubCommand::Peek,
            other => SubCommand::Invalid(other.to_owned()),
        }
    }
}

/// A parsed `GET` command. The queue name never contains `/` or `:`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetCommand {
    pub queue_name: String,
    pub sub_command: SubCommand,
    pub consumer_group: Option<String>,
    /// The `t=<n>` hint of the client, it isn't interpreted by the server.
    pub timeout: Option<u64>,
}

impl fmt::Display for GetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.queue_name)?;

        if let Some(group) = &self.consumer_group {
            write!(f, ":{group}")?;
        }

        match &self.sub_command {
            SubCommand::Open => Ok(()),
            SubCommand::Close => f.write_str("/close"),
            SubCommand::CloseOpen => f.write_str("/close/open"),
            SubCommand::Abort => f.write_str("/abort"),
            SubCommand::Peek => f.write_str("/peek"),
            SubCommand::Invalid(s) => write!(f, "/{s}"),
        }
    }
}

/// Parses the tokens of a `GET` line, the first token is the command name itself.
pub fn parse_get(input: &[String]) -> Result<GetCommand> {
    let spec = match input.get(1) {
        Some(spec) => spec,
        None => return protocol_error("Queue name is missing"),
    };

    let (spec, timeout) = strip_timeout(spec);

    let (queue_part, sub_command) = match spec.split_once('/') {
        Some((queue, sub)) => (queue, sub.trim_matches('/')),
        None => (spec.as_str(), ""),
    };

    let mut segments = queue_part.splitn(3, ':');
    let queue_name = segments.next().unwrap_or_default().to_owned();
    let consumer_group = segments.next().filter(|g| !g.is_empty()).map(str::to_owned);

    Ok(GetCommand {
        queue_name,
        sub_command: SubCommand::from(sub_command),
        consumer_group,
        timeout,
    })
}

/// Removes all the `t=<digits>` markers with their optional trailing `/`. Returns the value of
/// the first one.
fn strip_timeout(spec: &str) -> (String, Option<u64>) {
    let mut stripped = String::with_capacity(spec.len());
    let mut timeout = None;
    let mut rest = spec;

    while let Some(pos) = rest.find(TIMEOUT_MARKER) {
        let after = &rest[pos + TIMEOUT_MARKER.len()..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();

        if digits == 0 {
            stripped.push_str(&rest[..pos + TIMEOUT_MARKER.len()]);
            rest = after;
            continue;
        }

        if timeout.is_none() {
            timeout = after[..digits].parse().ok();
        }

        stripped.push_str(&rest[..pos]);

        let after = &after[digits..];
        rest = after.strip_prefix('/').unwrap_or(after);
    }

    stripped.push_str(rest);

    (stripped, timeout)
}
