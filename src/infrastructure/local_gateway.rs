use crate::domain::ports::{GatewayOrder, GatewayOrderRequest, PaymentGateway};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Offline gateway that mints sequential order ids (`order_local_000001`, ...).
///
/// Used for dry runs: orders are recorded exactly as with the real gateway and
/// payments are still verified against the configured secret.
#[derive(Debug, Default)]
pub struct LocalGateway {
    sequence: AtomicU64,
}

impl LocalGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentGateway for LocalGateway {
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder> {
        let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(GatewayOrder {
            id: format!("order_local_{:06}", n),
            amount: request.amount,
        })
    }
}
