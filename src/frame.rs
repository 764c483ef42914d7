//! Randomized request frames.
//!
//! A frame is `size` ASCII letters followed by a single `\n`. The payload
//! never contains the delimiter, so the server sees exactly one line per send.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Line terminator shared by requests and replies
pub const FRAME_DELIMITER: u8 = b'\n';

/// Payload alphabet: `[A-Za-z]`
pub const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// A single request line, delimiter included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
}

impl Frame {
    fn from_payload(mut bytes: Vec<u8>) -> Self {
        bytes.push(FRAME_DELIMITER);
        Self { bytes }
    }

    /// Letters without the trailing delimiter
    pub fn payload(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() - 1]
    }

    /// Wire bytes, delimiter included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Wire length, always payload size + 1
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Per-session frame source. Each session owns one so no RNG state is shared
/// between tasks.
pub struct MessageGenerator {
    rng: StdRng,
}

impl MessageGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic generator for tests and benchmarks
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_frame(&mut self, size: usize) -> Frame {
        fill_frame(&mut self.rng, size)
    }
}

impl Default for MessageGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Build one frame from the thread-local RNG
pub fn generate(size: usize) -> Frame {
    fill_frame(&mut rand::rng(), size)
}

fn fill_frame<R: Rng + ?Sized>(rng: &mut R, size: usize) -> Frame {
    let mut bytes = Vec::with_capacity(size + 1);
    bytes.extend((0..size).map(|_| LETTERS[rng.random_range(0..LETTERS.len())]));
    Frame::from_payload(bytes)
}
