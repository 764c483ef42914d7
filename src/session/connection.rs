//! Newline-delimited TCP connection used by one session

use crate::error::SessionError;
use crate::frame::{Frame, FRAME_DELIMITER};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Upper bound on the half-close sent when a session ends
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Bytes a reply may carry beyond the echoed frame, for servers that
/// decorate what they send back
pub const REPLY_SLACK: usize = 4096;

/// Longest reply line accepted for frames of `msg_size` payload bytes
pub fn reply_limit(msg_size: usize) -> usize {
    msg_size.saturating_add(1 + REPLY_SLACK)
}

/// A connected client socket that exchanges `\n`-terminated lines
#[derive(Debug)]
pub struct LineConnection {
    client: usize,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    line: Vec<u8>,
    reply_limit: usize,
}

impl LineConnection {
    /// Open a connection to `target`, giving up after `connect_timeout`
    pub async fn connect(
        client: usize,
        target: &str,
        connect_timeout: Duration,
    ) -> Result<Self, SessionError> {
        let stream = match timeout(connect_timeout, TcpStream::connect(target)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(SessionError::Connect {
                    client,
                    target: target.to_string(),
                    source,
                })
            }
            Err(_) => {
                return Err(SessionError::Connect {
                    client,
                    target: target.to_string(),
                    source: io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("no answer within {}s", connect_timeout.as_secs_f64()),
                    ),
                })
            }
        };

        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            client,
            reader: BufReader::new(read_half),
            writer: write_half,
            line: Vec::with_capacity(256),
            reply_limit: reply_limit(crate::defaults::DEFAULT_MSG_SIZE),
        })
    }

    /// Cap the length of a reply line, delimiter included
    pub fn with_reply_limit(mut self, limit: usize) -> Self {
        self.reply_limit = limit.max(1);
        self
    }

    /// Toggle Nagle's algorithm on the underlying socket
    pub fn set_nodelay(&self, nodelay: bool) -> io::Result<()> {
        self.writer.as_ref().set_nodelay(nodelay)
    }

    pub fn client(&self) -> usize {
        self.client
    }

    /// Write one whole frame. A write that cannot finish within `bound`
    /// counts as a reply timeout.
    pub async fn send_frame(&mut self, frame: &Frame, bound: Duration) -> Result<(), SessionError> {
        let client = self.client;
        let writer = &mut self.writer;
        let write = async {
            writer.write_all(frame.as_bytes()).await?;
            writer.flush().await
        };

        match timeout(bound, write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(classify(client, source)),
            Err(_) => Err(SessionError::ReplyTimeout { client, after: bound }),
        }
    }

    /// Read one reply line, returning its length including the delimiter.
    ///
    /// End of stream, or a partial line followed by end of stream, means the
    /// server went away. A line longer than the reply limit is an I/O error.
    pub async fn read_reply(&mut self, bound: Duration) -> Result<usize, SessionError> {
        let client = self.client;
        let limit = self.reply_limit as u64;
        self.line.clear();

        let mut capped = (&mut self.reader).take(limit);
        let read = match timeout(bound, capped.read_until(FRAME_DELIMITER, &mut self.line)).await {
            Ok(read) => read,
            Err(_) => return Err(SessionError::ReplyTimeout { client, after: bound }),
        };

        match read {
            Ok(0) => Err(SessionError::Disconnected { client }),
            Ok(n) if self.line.last() == Some(&FRAME_DELIMITER) => Ok(n),
            Ok(n) if n as u64 >= limit => Err(SessionError::Io {
                client,
                source: io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("reply exceeds {} bytes without a newline", limit),
                ),
            }),
            Ok(_) => Err(SessionError::Disconnected { client }),
            Err(source) => Err(classify(client, source)),
        }
    }

    /// The most recent reply line, delimiter included
    pub fn last_reply(&self) -> &[u8] {
        &self.line
    }

    /// Half-close the write side and drop the socket
    pub async fn close(mut self) {
        let _ = timeout(CLOSE_GRACE, self.writer.shutdown()).await;
    }
}

/// Peer resets look the same to a client as an orderly close
fn classify(client: usize, source: io::Error) -> SessionError {
    match source.kind() {
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => SessionError::Disconnected { client },
        _ => SessionError::Io { client, source },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MessageGenerator;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        (listener, addr)
    }

    #[tokio::test]
    async fn test_round_trip_against_echo() {
        let (listener, addr) = listener().await;
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let (r, mut w) = socket.split();
            let mut reader = BufReader::new(r);
            let mut line = Vec::new();
            while reader.read_until(b'\n', &mut line).await.unwrap() > 0 {
                w.write_all(&line).await.unwrap();
                line.clear();
            }
        });

        let mut conn = LineConnection::connect(7, &addr, Duration::from_secs(1)).await.unwrap();
        assert_eq!(conn.client(), 7);

        let frame = MessageGenerator::with_seed(1).next_frame(16);
        conn.send_frame(&frame, Duration::from_secs(1)).await.unwrap();
        let n = conn.read_reply(Duration::from_secs(1)).await.unwrap();

        assert_eq!(n, 17);
        assert_eq!(conn.last_reply(), frame.as_bytes());
        conn.close().await;
    }

    #[tokio::test]
    async fn test_refused_connection() {
        let (listener, addr) = listener().await;
        drop(listener);

        let err = LineConnection::connect(2, &addr, Duration::from_secs(1)).await.unwrap_err();
        assert!(err.is_connect());
        assert_eq!(err.client(), 2);
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let (listener, addr) = listener().await;
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut sink = [0u8; 64];
            // read but never answer
            while socket.read(&mut sink).await.unwrap_or(0) > 0 {}
        });

        let mut conn = LineConnection::connect(0, &addr, Duration::from_secs(1)).await.unwrap();
        conn.send_frame(&crate::frame::generate(8), Duration::from_secs(1))
            .await
            .unwrap();
        let err = conn.read_reply(Duration::from_millis(100)).await.unwrap_err();
        assert_eq!(err.kind(), "reply-timeout");

        conn.close().await;
        server.abort();
    }

    #[tokio::test]
    async fn test_partial_line_then_close_is_disconnect() {
        let (listener, addr) = listener().await;
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"half a li").await.unwrap();
        });

        let mut conn = LineConnection::connect(4, &addr, Duration::from_secs(1)).await.unwrap();
        let err = conn.read_reply(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, SessionError::Disconnected { client: 4 }));
    }

    #[tokio::test]
    async fn test_endless_reply_is_capped() {
        let (listener, addr) = listener().await;
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let chunk = [b'x'; 1024];
            // stream bytes without ever ending the line
            while socket.write_all(&chunk).await.is_ok() {}
        });

        let mut conn = LineConnection::connect(5, &addr, Duration::from_secs(1))
            .await
            .unwrap()
            .with_reply_limit(reply_limit(16));
        let err = conn.read_reply(Duration::from_secs(5)).await.unwrap_err();

        assert_eq!(err.kind(), "io");
        assert!(err.to_string().contains("without a newline"), "{}", err);
        assert_eq!(conn.last_reply().len(), reply_limit(16));
    }

    #[tokio::test]
    async fn test_reply_at_limit_is_accepted() {
        let (listener, addr) = listener().await;
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"abcd\n").await.unwrap();
            let mut sink = [0u8; 16];
            while socket.read(&mut sink).await.unwrap_or(0) > 0 {}
        });

        let mut conn = LineConnection::connect(0, &addr, Duration::from_secs(1))
            .await
            .unwrap()
            .with_reply_limit(5);
        assert_eq!(conn.read_reply(Duration::from_secs(1)).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_nodelay_is_applied() {
        let (listener, addr) = listener().await;
        tokio::spawn(async move {
            let _held = listener.accept().await;
            tokio::time::sleep(Duration::from_secs(1)).await;
        });

        let conn = LineConnection::connect(0, &addr, Duration::from_secs(1)).await.unwrap();
        conn.set_nodelay(true).unwrap();
        assert!(conn.writer.as_ref().nodelay().unwrap());
    }

    #[tokio::test]
    async fn test_immediate_close_is_disconnect() {
        let (listener, addr) = listener().await;
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        let mut conn = LineConnection::connect(1, &addr, Duration::from_secs(1)).await.unwrap();
        let err = conn.read_reply(Duration::from_secs(1)).await.unwrap_err();
        assert_eq!(err.kind(), "disconnected");
    }
}
