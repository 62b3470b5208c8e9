use super::messages::Response;
use crate::error::Result;
use std::io::Write;

/// Writes one JSON document per response line.
pub struct ResponseWriter<W: Write> {
    sink: W,
}

impl<W: Write> ResponseWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn write_response(&mut self, response: &Response) -> Result<()> {
        serde_json::to_writer(&mut self.sink, response)?;
        self.sink.write_all(b"\n")?;
        self.sink.flush()?;
        Ok(())
    }
}
