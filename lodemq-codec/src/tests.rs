use super::*;
use bytes::{Bytes, BytesMut};
use codec::{ClientCodec, TextCodec};
use frame::{ErrorKind, Frame, Reply, Request};
use tokio_util::codec::{Decoder, Encoder};

fn encode_frame(frame: Frame) -> BytesMut {
    let mut encoder = TextCodec {};
    let mut buf = BytesMut::with_capacity(1024);

    let res = encoder.encode(frame, &mut buf);

    assert!(res.is_ok());

    buf
}

#[test]
fn encode_value_and_end() {
    let buf = encode_frame(Frame::Frames(vec![
        frame::value("work", Bytes::from_static(b"hello")),
        Reply::End,
    ]));

    assert_eq!(&buf[..], b"VALUE work 0 5\r\nhello\r\nEND\r\n");
}

#[test]
fn encode_error_lines() {
    let buf = encode_frame(Frame::Frame(frame::error(
        ErrorKind::ClientError,
        "Close current item first",
    )));

    assert_eq!(&buf[..], b"CLIENT_ERROR Close current item first\r\n");

    let buf = encode_frame(Frame::Frame(frame::error(ErrorKind::Error, "")));

    assert_eq!(&buf[..], b"ERROR\r\n");
}

#[test]
fn encode_binary_payload_verbatim() {
    let payload = Bytes::from_static(b"a\r\nEND\r\n\x00\xff");
    let buf = encode_frame(Frame::Frame(frame::value("bin", payload.clone())));

    let mut expected = b"VALUE bin 0 10\r\n".to_vec();
    expected.extend_from_slice(&payload);
    expected.extend_from_slice(b"\r\n");

    assert_eq!(&buf[..], &expected[..]);
}

#[test]
fn decode_request_lines() {
    let mut decoder = TextCodec {};
    let mut buf = BytesMut::from(&b"GET work/open\r\n\r\nget  other:grp/peek\nSTA"[..]);

    let first = decoder.decode(&mut buf).unwrap().unwrap();
    assert_eq!(first.args, vec!["GET", "work/open"]);

    let second = decoder.decode(&mut buf).unwrap().unwrap();
    assert_eq!(second.command(), Some("get"));
    assert_eq!(second.args[1], "other:grp/peek");

    assert!(decoder.decode(&mut buf).unwrap().is_none());
    assert_eq!(&buf[..], b"STA");
}

#[test]
fn decode_too_long_line_is_an_error() {
    let mut decoder = TextCodec {};
    let mut buf = BytesMut::from(&vec![b'a'; codec::MAX_LINE_LENGTH + 1][..]);

    let err = decoder.decode(&mut buf).unwrap_err();

    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}

#[test]
fn decode_invalid_utf8_is_an_error() {
    let mut decoder = TextCodec {};
    let mut buf = BytesMut::from(&b"GET \xff\xfe\r\n"[..]);

    assert!(decoder.decode(&mut buf).is_err());
}

#[test]
fn client_encodes_request() {
    let mut encoder = ClientCodec {};
    let mut buf = BytesMut::new();

    encoder
        .encode(Request::from_iter(["GET", "work:grp/close/open"]), &mut buf)
        .unwrap();

    assert_eq!(&buf[..], b"GET work:grp/close/open\r\n");
    assert!(encoder.encode(Request::default(), &mut buf).is_err());
}

#[test]
fn client_decodes_replies() {
    let mut decoder = ClientCodec {};
    let mut buf = BytesMut::from(
        &b"VALUE work 0 5\r\nhello\r\nEND\r\nSTAT cmd_get 3\r\nVERSION 0.1.0\r\nSERVER_ERROR Queue work not found\r\nERROR\r\n"[..],
    );

    assert_eq!(
        decoder.decode(&mut buf).unwrap(),
        Some(frame::value("work", Bytes::from_static(b"hello")))
    );
    assert_eq!(decoder.decode(&mut buf).unwrap(), Some(Reply::End));
    assert_eq!(decoder.decode(&mut buf).unwrap(), Some(frame::stat("cmd_get", 3)));
    assert_eq!(
        decoder.decode(&mut buf).unwrap(),
        Some(Reply::Version("0.1.0".to_owned()))
    );
    assert_eq!(
        decoder.decode(&mut buf).unwrap(),
        Some(frame::error(ErrorKind::ServerError, "Queue work not found"))
    );
    assert_eq!(decoder.decode(&mut buf).unwrap(), Some(frame::error(ErrorKind::Error, "")));
    assert!(decoder.decode(&mut buf).unwrap().is_none());
}

#[test]
fn client_waits_for_the_whole_data_block() {
    let mut decoder = ClientCodec {};
    let mut buf = BytesMut::from(&b"VALUE work 0 11\r\nhello"[..]);

    assert!(decoder.decode(&mut buf).unwrap().is_none());

    buf.extend_from_slice(b" world\r");
    assert!(decoder.decode(&mut buf).unwrap().is_none());

    buf.extend_from_slice(b"\n");
    assert_eq!(
        decoder.decode(&mut buf).unwrap(),
        Some(frame::value("work", Bytes::from_static(b"hello world")))
    );
    assert!(buf.is_empty());
}

#[test]
fn client_rejects_unknown_reply() {
    let mut decoder = ClientCodec {};
    let mut buf = BytesMut::from(&b"STORED\r\n"[..]);

    assert!(decoder.decode(&mut buf).is_err());
}
