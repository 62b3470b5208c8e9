use super::messages::Request;
use crate::error::{PaymentError, Result};
use std::io::BufRead;

/// Reads requests from a JSON-lines source.
///
/// Blank lines are skipped. A malformed line yields an error for that line
/// only; reading continues with the next one.
pub struct RequestReader<R: BufRead> {
    source: R,
}

impl<R: BufRead> RequestReader<R> {
    /// Creates a new `RequestReader` from any `BufRead` source (e.g., a buffered file).
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Returns an iterator that lazily reads and deserializes requests.
    pub fn requests(self) -> impl Iterator<Item = Result<Request>> {
        self.source
            .lines()
            .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
            .map(|line| {
                let line = line?;
                serde_json::from_str(&line).map_err(|e| {
                    PaymentError::ValidationError(format!("Malformed request: {}", e))
                })
            })
    }
}
