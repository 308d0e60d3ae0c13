//! Module `file_ops`
//!
//! The length-prefixed transfer run over the data connection: a decimal
//! length terminated by `\n`, followed by exactly that many payload bytes.

use log::{debug, info, warn};
use std::io::{self, ErrorKind};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};

use crate::error::TransferError;
use crate::storage::Payload;

/// Upper bound on the up-front allocation for an incoming payload.
const MAX_PREALLOC: usize = 16 * 1024 * 1024;

/// Encodes the transfer header for a payload of `len` bytes.
pub fn encode_header(len: usize) -> String {
    format!("{}\n", len)
}

/// Sends the transfer header.
pub async fn send_header<W>(writer: &mut W, payload: &Payload) -> Result<(), TransferError>
where
    W: AsyncWrite + Unpin,
{
    let header = encode_header(payload.len());
    debug!("Sending transfer header {:?}", header);
    send_all(writer, header.as_bytes()).await.map(|_| ())
}

/// Writes the whole buffer, issuing further writes after partial ones until
/// everything is sent or a hard error occurs.
pub async fn send_all<W>(writer: &mut W, buf: &[u8]) -> Result<usize, TransferError>
where
    W: AsyncWrite + Unpin,
{
    let mut sent = 0;
    while sent < buf.len() {
        match writer.write(&buf[sent..]).await {
            Ok(0) => {
                return Err(TransferError::IncompleteSend {
                    expected: buf.len(),
                    sent,
                    source: io::Error::from(ErrorKind::WriteZero),
                });
            }
            Ok(n) => sent += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(TransferError::IncompleteSend {
                    expected: buf.len(),
                    sent,
                    source: e,
                });
            }
        }
    }

    writer
        .flush()
        .await
        .map_err(|e| TransferError::IncompleteSend {
            expected: buf.len(),
            sent,
            source: e,
        })?;
    Ok(sent)
}

/// Reads the header line and parses the declared payload length.
///
/// At most `max_len` bytes (newline included) are consumed; nothing past the
/// newline is read.
pub async fn read_header<R>(reader: &mut R, max_len: usize) -> Result<usize, TransferError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    (&mut *reader)
        .take(max_len as u64)
        .read_until(b'\n', &mut line)
        .await?;

    if line.last() != Some(&b'\n') {
        return Err(TransferError::InvalidHeader(
            String::from_utf8_lossy(&line).into_owned(),
        ));
    }

    let text = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();
    text.trim_end_matches('\r')
        .parse::<usize>()
        .map_err(|_| TransferError::InvalidHeader(text))
}

/// Receives one length-prefixed payload from the data connection.
pub async fn receive_payload<R>(
    stream: R,
    max_header_length: usize,
    recv_buffer_size: usize,
) -> Result<Payload, TransferError>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::with_capacity(recv_buffer_size.max(1), stream);
    let expected = read_header(&mut reader, max_header_length).await?;
    info!("Receiving {} bytes", expected);

    let mut received = Vec::with_capacity(expected.min(MAX_PREALLOC));
    let mut chunk = vec![0u8; recv_buffer_size.max(1)];

    while received.len() < expected {
        let want = (expected - received.len()).min(chunk.len());
        let n = reader.read(&mut chunk[..want]).await?;
        if n == 0 {
            warn!(
                "Data connection closed early: {} of {} bytes",
                received.len(),
                expected
            );
            return Err(TransferError::ShortTransfer {
                expected,
                received: received.len(),
            });
        }
        received.extend_from_slice(&chunk[..n]);
    }

    Ok(Payload::new(received))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_decimal_length_and_newline() {
        assert_eq!(encode_header(3), "3\n");
        assert_eq!(encode_header(0), "0\n");
    }

    #[tokio::test]
    async fn header_and_payload_reach_the_receiver() {
        let (mut tx, rx) = tokio::io::duplex(16);
        let payload = Payload::new(b"hi\n".to_vec());

        let sender = async {
            send_header(&mut tx, &payload).await.unwrap();
            send_all(&mut tx, payload.as_bytes()).await.unwrap()
        };
        let (sent, received) = tokio::join!(sender, receive_payload(rx, 32, 4));

        assert_eq!(sent, 3);
        assert_eq!(received.unwrap().as_bytes(), b"hi\n");
    }

    #[tokio::test]
    async fn large_payload_survives_partial_writes() {
        // Duplex capacity far below the payload size forces partial writes.
        let (mut tx, rx) = tokio::io::duplex(64);
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let payload = Payload::new(data.clone());

        let sender = async {
            send_header(&mut tx, &payload).await.unwrap();
            send_all(&mut tx, payload.as_bytes()).await.unwrap();
        };
        let (_, received) = tokio::join!(sender, receive_payload(rx, 32, 8192));

        assert_eq!(received.unwrap().into_bytes(), data);
    }

    #[tokio::test]
    async fn header_read_stops_at_newline() {
        let mut reader = BufReader::new(&b"5\nhello"[..]);
        assert_eq!(read_header(&mut reader, 32).await.unwrap(), 5);

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, b"hello");
    }

    #[tokio::test]
    async fn empty_or_garbage_header_is_rejected() {
        let empty = receive_payload(&b""[..], 32, 16).await.unwrap_err();
        assert!(matches!(empty, TransferError::InvalidHeader(_)));

        let garbage = receive_payload(&b"abc\nxyz"[..], 32, 16).await.unwrap_err();
        assert!(matches!(garbage, TransferError::InvalidHeader(h) if h == "abc"));

        let unterminated = receive_payload(&b"123456789"[..], 4, 16).await.unwrap_err();
        assert!(matches!(unterminated, TransferError::InvalidHeader(_)));
    }

    #[tokio::test]
    async fn early_close_is_a_short_transfer() {
        let err = receive_payload(&b"10\nabc"[..], 32, 16).await.unwrap_err();
        match err {
            TransferError::ShortTransfer { expected, received } => {
                assert_eq!(expected, 10);
                assert_eq!(received, 3);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn zero_length_payload_is_accepted() {
        let payload = receive_payload(&b"0\n"[..], 32, 16).await.unwrap();
        assert!(payload.is_empty());
    }
}
