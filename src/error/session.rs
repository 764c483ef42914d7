//! Failure kinds that end a single client session.
//!
//! These never abort the whole run: the pool records them in the session's
//! report and keeps going.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// Refused, unreachable, unresolvable or timed-out connect
    #[error("client {client}: connection to {target} failed: {source}")]
    Connect {
        client: usize,
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// No complete reply line (or no write progress) within the bound
    #[error("client {client}: timed out after {}s waiting for echo", .after.as_secs_f64())]
    ReplyTimeout { client: usize, after: Duration },

    /// Server closed the stream, possibly mid-line
    #[error("client {client}: server closed the connection")]
    Disconnected { client: usize },

    #[error("client {client}: I/O error: {source}")]
    Io {
        client: usize,
        #[source]
        source: std::io::Error,
    },

    /// The session task panicked or was cancelled by the runtime
    #[error("client {client}: session task aborted: {reason}")]
    Aborted { client: usize, reason: String },
}

impl SessionError {
    /// Index of the client that failed
    pub fn client(&self) -> usize {
        match self {
            Self::Connect { client, .. }
            | Self::ReplyTimeout { client, .. }
            | Self::Disconnected { client }
            | Self::Io { client, .. }
            | Self::Aborted { client, .. } => *client,
        }
    }

    /// Short stable name used in logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::ReplyTimeout { .. } => "reply-timeout",
            Self::Disconnected { .. } => "disconnected",
            Self::Io { .. } => "io",
            Self::Aborted { .. } => "aborted",
        }
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_client() {
        let err = SessionError::Io {
            client: 7,
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe"),
        };
        assert_eq!(err.client(), 7);
        assert_eq!(err.kind(), "io");
        assert!(!err.is_connect());
    }

    #[test]
    fn test_display_includes_client_index() {
        let err = SessionError::ReplyTimeout {
            client: 4,
            after: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "client 4: timed out after 5s waiting for echo");

        let err = SessionError::Connect {
            client: 2,
            target: "127.0.0.1:9".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
        };
        assert!(err.is_connect());
        assert!(err.to_string().starts_with("client 2: connection to 127.0.0.1:9 failed"));
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let err = SessionError::Connect {
            client: 0,
            target: "localhost:1".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out"),
        };
        let source = err.source().expect("io source");
        assert!(source.to_string().contains("connect timed out"));
    }
}
