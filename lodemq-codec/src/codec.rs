use crate::frame::{self, ErrorKind, Frame, Reply, Request};
use crate::frame_error;
use bytes::{BufMut, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

/// The longest request line the server is willing to buffer.
pub const MAX_LINE_LENGTH: usize = 8192;

const CRLF: &[u8] = b"\r\n";

/// Server side codec, decodes request lines and encodes replies.
#[derive(Debug, Default)]
pub struct TextCodec {}

/// Client side codec, encodes request lines and decodes replies.
#[derive(Debug, Default)]
pub struct ClientCodec {}

impl Decoder for TextCodec {
    type Item = Request;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let pos = match find_newline(src) {
                Some(pos) => pos,
                None if src.len() > MAX_LINE_LENGTH => return frame_error!("Request line is too long"),
                None => return Ok(None),
            };

            if pos > MAX_LINE_LENGTH {
                return frame_error!("Request line is too long");
            }

            let line = src.split_to(pos + 1);
            let text = line_as_str(&line)?;
            let args = text.split_whitespace().map(str::to_owned).collect::<Vec<_>>();

            // Empty lines are skipped, clients like telnet send them.
            if !args.is_empty() {
                return Ok(Some(Request { args }));
            }
        }
    }
}

impl Encoder<Frame> for TextCodec {
    type Error = io::Error;

    fn encode(&mut self, event: Frame, buf: &mut BytesMut) -> Result<(), Self::Error> {
        match event {
            Frame::Frame(reply) => encode_reply(buf, reply),
            Frame::Frames(replies) => {
                for reply in replies {
                    encode_reply(buf, reply);
                }
            }
        }

        Ok(())
    }
}

impl Encoder<Request> for ClientCodec {
    type Error = io::Error;

    fn encode(&mut self, request: Request, buf: &mut BytesMut) -> Result<(), Self::Error> {
        if request.args.is_empty() {
            return frame_error!("Empty request");
        }

        buf.put_slice(request.args.join(" ").as_bytes());
        buf.put_slice(CRLF);

        Ok(())
    }
}

impl Decoder for ClientCodec {
    type Item = Reply;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let pos = match find_newline(src) {
            Some(pos) => pos,
            None => return Ok(None),
        };

        let line = line_as_str(&src[..pos + 1])?;
        let (head, rest) = line.split_once(' ').unwrap_or((line, ""));

        let reply = match head {
            frame::VALUE => {
                let (key, len) = decode_value_header(rest)?;
                let block_len = pos + 1 + len + CRLF.len();

                // The data block hasn't arrived completely, wait for more bytes.
                if src.len() < block_len {
                    src.reserve(block_len - src.len());

                    return Ok(None);
                }

                let _header = src.split_to(pos + 1);
                let data = src.split_to(len).freeze();
                let trailer = src.split_to(CRLF.len());

                if &trailer[..] != CRLF {
                    return frame_error!("Data block is not terminated by CRLF");
                }

                return Ok(Some(Reply::Value { key, data }));
            }
            frame::STAT => match rest.split_once(' ') {
                Some((name, value)) => frame::stat(name, value),
                None => return frame_error!(format!("Malformed stat line {line}")),
            },
            frame::VERSION => Reply::Version(rest.to_owned()),
            frame::END => Reply::End,
            other => match ErrorKind::from_token(other) {
                Some(kind) => frame::error(kind, rest),
                None => return frame_error!(format!("Unknown reply {line}")),
            },
        };

        let _line = src.split_to(pos + 1);

        Ok(Some(reply))
    }
}

fn encode_reply(buf: &mut BytesMut, reply: Reply) {
    match reply {
        Reply::Value { key, data } => {
            buf.reserve(key.len() + data.len() + 32);
            buf.put_slice(format!("{} {} 0 {}", frame::VALUE, key, data.len()).as_bytes());
            buf.put_slice(CRLF);
            buf.put_slice(&data);
            buf.put_slice(CRLF);
        }
        Reply::Stat { name, value } => {
            buf.put_slice(format!("{} {} {}", frame::STAT, name, value).as_bytes());
            buf.put_slice(CRLF);
        }
        Reply::Version(version) => {
            buf.put_slice(format!("{} {}", frame::VERSION, version).as_bytes());
            buf.put_slice(CRLF);
        }
        Reply::End => {
            buf.put_slice(frame::END.as_bytes());
            buf.put_slice(CRLF);
        }
        Reply::Error(kind, text) if text.is_empty() => {
            buf.put_slice(kind.as_str().as_bytes());
            buf.put_slice(CRLF);
        }
        Reply::Error(kind, text) => {
            buf.put_slice(format!("{} {}", kind, text).as_bytes());
            buf.put_slice(CRLF);
        }
    }
}

/// Parses the `<key> <flags> <bytes>` part of a value header.
fn decode_value_header(header: &str) -> io::Result<(String, usize)> {
    let mut parts = header.split(' ');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(_flags), Some(len)) if !key.is_empty() => match len.parse::<usize>() {
            Ok(len) => Ok((key.to_owned(), len)),
            Err(_) => frame_error!(format!("Invalid data length {len}")),
        },
        _ => frame_error!(format!("Malformed value header {header}")),
    }
}

fn find_newline(src: &[u8]) -> Option<usize> {
    src.iter().position(|b| *b == b'\n')
}

/// Returns the line without the line ending, which can be `\n` or `\r\n`.
fn line_as_str(line: &[u8]) -> io::Result<&str> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    std::str::from_utf8(line).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
