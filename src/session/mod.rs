//! One simulated chat client
//!
//! A session connects, then repeatedly sends a random frame and waits for the
//! server's one-line acknowledgement, recording each round trip. It ends at
//! the run's deadline, when the run is stopped, or on the first error. The
//! deadline is shared by every session and counts from the start of the run,
//! so a session that connects late gets a shorter window, never a longer one.
//! Errors never escape a session: they are logged and folded into its
//! [`SessionReport`].

pub mod connection;
pub mod pacing;
pub mod stop;

pub use connection::{reply_limit, LineConnection};
pub use pacing::Pacer;
pub use stop::{stop_channel, StopHandle, StopSignal};

use crate::executor::ExecutionConfig;
use crate::frame::MessageGenerator;
use crate::logging::{Logger, SessionLogger};
use crate::models::{SessionReport, Termination};
use crate::types::SessionState;
use std::sync::Arc;
use tokio::time::{sleep_until, Instant};

/// A single client of the run
pub struct ClientSession {
    index: usize,
    config: Arc<ExecutionConfig>,
    generator: MessageGenerator,
    events: SessionLogger,
    logger: Arc<Logger>,
    state: SessionState,
    latencies_ms: Vec<f64>,
    frames_sent: u64,
}

impl ClientSession {
    pub fn new(index: usize, config: Arc<ExecutionConfig>, logger: Arc<Logger>) -> Self {
        Self {
            index,
            config,
            generator: MessageGenerator::new(),
            events: SessionLogger::new(logger.clone()),
            logger,
            state: SessionState::Connecting,
            latencies_ms: Vec::new(),
            frames_sent: 0,
        }
    }

    /// Replace the payload source, e.g. with a seeded one
    pub fn with_generator(mut self, generator: MessageGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session until `deadline`, a stop request, or a failure.
    /// No frame is written at or after `deadline`.
    pub async fn run(mut self, mut stop: StopSignal, deadline: Instant) -> SessionReport {
        let started = Instant::now();
        let target = self.config.target.clone();

        let connected = tokio::select! {
            biased;
            _ = stop.stopped() => None,
            result = LineConnection::connect(self.index, &target, self.config.connect_timeout) => Some(result),
        };

        let mut conn = match connected {
            None => return self.finish(Termination::Stopped, started).await,
            Some(Err(err)) => {
                self.events.log_failure(&err).await;
                return self.finish(Termination::Failed(err), started).await;
            }
            Some(Ok(conn)) => conn.with_reply_limit(reply_limit(self.config.msg_size)),
        };

        // small frames must not wait on Nagle
        if let Err(err) = conn.set_nodelay(true) {
            self.events.log_socket_option(self.index, "TCP_NODELAY", &err).await;
        }

        self.events.log_connected(self.index, &target).await;
        self.transition(SessionState::Active).await;

        let termination = self.exchange(&mut conn, deadline, &mut stop).await;

        match &termination {
            Termination::Stopped => self.transition(SessionState::Cancelling).await,
            Termination::Failed(err) => self.events.log_failure(err).await,
            Termination::Completed => {}
        }

        conn.close().await;
        self.finish(termination, started).await
    }

    /// Send/receive loop. Returns how the session ended.
    async fn exchange(
        &mut self,
        conn: &mut LineConnection,
        deadline: Instant,
        stop: &mut StopSignal,
    ) -> Termination {
        let reply_timeout = self.config.reply_timeout;
        let mut pacer = Pacer::new(self.config.pacing, self.config.rate, Instant::now());

        loop {
            if stop.is_stopped() {
                return stop_outcome(deadline);
            }

            let now = Instant::now();
            if now >= deadline {
                return Termination::Completed;
            }

            let due = pacer.next_send().min(deadline);
            if due > now {
                tokio::select! {
                    biased;
                    _ = stop.stopped() => return stop_outcome(deadline),
                    _ = sleep_until(due) => {}
                }
                continue;
            }

            let frame = self.generator.next_frame(self.config.msg_size);
            let sent_at = Instant::now();
            if let Err(err) = conn.send_frame(&frame, reply_timeout).await {
                return Termination::Failed(err);
            }
            self.frames_sent += 1;

            // a reply still in flight at stop time yields no sample
            let reply = tokio::select! {
                biased;
                _ = stop.stopped() => return stop_outcome(deadline),
                reply = conn.read_reply(reply_timeout) => reply,
            };

            match reply {
                Ok(_) => {
                    self.latencies_ms.push(sent_at.elapsed().as_secs_f64() * 1000.0);
                }
                Err(err) => return Termination::Failed(err),
            }

            pacer.advance(Instant::now());
        }
    }

    async fn transition(&mut self, next: SessionState) {
        crate::log_debug!(
            self.logger,
            "client {} {} -> {}",
            self.index,
            self.state.as_str(),
            next.as_str()
        );
        self.state = next;
    }

    async fn finish(mut self, termination: Termination, started: Instant) -> SessionReport {
        self.transition(SessionState::Closed).await;
        let report = SessionReport {
            index: self.index,
            latencies_ms: self.latencies_ms,
            frames_sent: self.frames_sent,
            final_state: self.state,
            termination,
            active_for: started.elapsed(),
        };
        self.events.log_finished(&report).await;
        report
    }
}

/// A stop that lands once the deadline has passed ends a full-length run
fn stop_outcome(deadline: Instant) -> Termination {
    if Instant::now() >= deadline {
        Termination::Completed
    } else {
        Termination::Stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Echo server answering every line on every connection
    async fn echo_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(async move {
                    let (r, mut w) = socket.split();
                    let mut reader = BufReader::new(r);
                    let mut line = Vec::new();
                    while reader.read_until(b'\n', &mut line).await.unwrap_or(0) > 0 {
                        if w.write_all(&line).await.is_err() {
                            break;
                        }
                        line.clear();
                    }
                });
            }
        });
        addr
    }

    /// Single-connection server that answers the first `replies` lines, then
    /// only reads. Reports once it sees the client close its side.
    async fn closing_server(replies: usize) -> (String, oneshot::Receiver<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (closed_tx, closed_rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let (r, mut w) = socket.split();
            let mut reader = BufReader::new(r);
            let mut line = Vec::new();
            let mut answered = 0;
            loop {
                match reader.read_until(b'\n', &mut line).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        if answered < replies {
                            w.write_all(&line).await.unwrap();
                            answered += 1;
                        }
                        line.clear();
                    }
                }
            }
            let _ = closed_tx.send(());
        });
        (addr, closed_rx)
    }

    fn config(target: String, rate: f64, reply_timeout: Duration) -> Arc<ExecutionConfig> {
        Arc::new(ExecutionConfig {
            target,
            clients: 1,
            rate,
            msg_size: 32,
            reply_timeout,
            connect_timeout: Duration::from_secs(1),
            ..Default::default()
        })
    }

    fn deadline_in(after: Duration) -> Instant {
        Instant::now() + after
    }

    fn logger() -> Arc<Logger> {
        Arc::new(Logger::new("SESSION"))
    }

    #[tokio::test]
    async fn test_session_completes_against_echo() {
        let addr = echo_server().await;
        let (_handle, signal) = stop_channel();

        let session = ClientSession::new(0, config(addr, 20.0, Duration::from_secs(1)), logger())
            .with_generator(MessageGenerator::with_seed(9));
        assert_eq!(session.state(), SessionState::Connecting);
        let report = session.run(signal, deadline_in(Duration::from_millis(500))).await;

        assert!(matches!(report.termination, Termination::Completed));
        assert_eq!(report.final_state, SessionState::Closed);
        // 20/s for half a second: about ten sends
        assert!(report.samples() >= 5, "got {} samples", report.samples());
        assert!(report.samples() <= 12, "got {} samples", report.samples());
        assert_eq!(report.frames_sent, report.samples() as u64);
        assert!(report.latencies_ms.iter().all(|&l| l >= 0.0));
    }

    #[tokio::test]
    async fn test_stop_interrupts_sleep_and_closes_connection() {
        let (addr, mut closed) = closing_server(usize::MAX).await;
        let (handle, signal) = stop_channel();

        // one frame per ten seconds: the session spends its life sleeping
        let session = ClientSession::new(3, config(addr, 0.1, Duration::from_secs(1)), logger());
        let task = tokio::spawn(session.run(signal, deadline_in(Duration::from_secs(60))));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(closed.try_recv().is_err(), "connection closed before stop");
        handle.stop();

        let report = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("session did not observe stop")
            .unwrap();
        assert_eq!(report.index, 3);
        assert!(matches!(report.termination, Termination::Stopped));
        assert_eq!(report.samples(), 1);

        tokio::time::timeout(Duration::from_secs(1), closed)
            .await
            .expect("server never saw the connection close")
            .unwrap();
    }

    #[tokio::test]
    async fn test_reply_timeout_closes_connection() {
        let (addr, closed) = closing_server(2).await;
        let (_handle, signal) = stop_channel();

        let report = ClientSession::new(0, config(addr, 50.0, Duration::from_millis(200)), logger())
            .run(signal, deadline_in(Duration::from_secs(10)))
            .await;

        assert_eq!(report.samples(), 2);
        assert_eq!(report.frames_sent, 3);
        assert_eq!(report.termination.error().unwrap().kind(), "reply-timeout");

        tokio::time::timeout(Duration::from_secs(1), closed)
            .await
            .expect("server never saw the connection close")
            .unwrap();
    }

    #[tokio::test]
    async fn test_deadline_passed_before_connect_sends_nothing() {
        let (addr, closed) = closing_server(usize::MAX).await;
        let (_handle, signal) = stop_channel();

        // a late connect inherits the run's deadline, not a fresh window
        let report = ClientSession::new(0, config(addr, 50.0, Duration::from_secs(1)), logger())
            .run(signal, Instant::now())
            .await;

        assert!(matches!(report.termination, Termination::Completed));
        assert_eq!(report.frames_sent, 0);
        tokio::time::timeout(Duration::from_secs(1), closed).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_stop_at_deadline_counts_as_completed() {
        // silent server: the session is always waiting on a reply
        let (addr, _closed) = closing_server(0).await;
        let (handle, signal) = stop_channel();
        let deadline = deadline_in(Duration::from_millis(200));

        let task = tokio::spawn(
            ClientSession::new(0, config(addr, 10.0, Duration::from_secs(5)), logger())
                .run(signal, deadline),
        );
        tokio::time::sleep_until(deadline).await;
        handle.stop();

        let report = task.await.unwrap();
        assert!(matches!(report.termination, Termination::Completed));
        assert_eq!(report.frames_sent, 1);
        assert_eq!(report.samples(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_without_samples() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let (_handle, signal) = stop_channel();
        let report = ClientSession::new(1, config(addr, 10.0, Duration::from_secs(1)), logger())
            .run(signal, deadline_in(Duration::from_secs(1)))
            .await;

        assert_eq!(report.samples(), 0);
        assert_eq!(report.frames_sent, 0);
        assert!(report.termination.error().unwrap().is_connect());
    }

    #[tokio::test]
    async fn test_server_close_ends_session() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let (r, mut w) = socket.split();
            let mut reader = BufReader::new(r);
            let mut line = Vec::new();
            // answer twice, then hang up
            for _ in 0..2 {
                reader.read_until(b'\n', &mut line).await.unwrap();
                w.write_all(b"ok\n").await.unwrap();
                line.clear();
            }
        });

        let (_handle, signal) = stop_channel();
        let report = ClientSession::new(0, config(addr, 50.0, Duration::from_secs(1)), logger())
            .run(signal, deadline_in(Duration::from_secs(5)))
            .await;

        assert_eq!(report.samples(), 2);
        assert_eq!(report.termination.error().unwrap().kind(), "disconnected");
    }

    #[tokio::test]
    async fn test_stop_before_connect() {
        let addr = echo_server().await;
        let (handle, signal) = stop_channel();
        handle.stop();

        let report = ClientSession::new(0, config(addr, 10.0, Duration::from_secs(1)), logger())
            .run(signal, deadline_in(Duration::from_secs(5)))
            .await;
        assert!(matches!(report.termination, Termination::Stopped));
        assert_eq!(report.frames_sent, 0);
    }
}
