//! JSON-lines front end: one request per input line, one response per output line.

pub mod messages;
pub mod request_reader;
pub mod response_writer;

use crate::application::engine::CreditEngine;
use messages::{Request, Response};

/// Runs one request through the engine. Failures become error responses.
pub async fn dispatch(engine: &CreditEngine, request: Request) -> Response {
    let result = match request {
        Request::CreateOrder(payload) => engine.create_order(payload).await.map(Response::from),
        Request::VerifyPayment(payload) => {
            engine.verify_payment(payload).await.map(Response::from)
        }
    };
    result.unwrap_or_else(|e| Response::from(&e))
}
