use super::requests::{CreateOrder, CreateOrderRequest};
use crate::domain::order::{CURRENCY, Order};
use crate::domain::ports::{GatewayOrderRequest, LedgerStoreRef, OrderNotes, PaymentGatewayRef};
use crate::error::{PaymentError, Result};
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Result of a successful order creation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderCreated {
    pub order_id: String,
    /// Gateway order amount in minor currency units.
    pub amount: u64,
}

/// Mints a gateway order and records it locally as `created`.
///
/// The local write happens after the gateway call and is not compensated if
/// it fails: the gateway order is then orphaned, and since no local record
/// exists it can never be settled.
pub struct OrderInitiator {
    store: LedgerStoreRef,
    gateway: PaymentGatewayRef,
}

impl OrderInitiator {
    pub fn new(store: LedgerStoreRef, gateway: PaymentGatewayRef) -> Self {
        Self { store, gateway }
    }

    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<OrderCreated> {
        let command = CreateOrder::try_from(request).inspect_err(|e| {
            warn!(error = %e, "Rejected order request");
        })?;

        let user_id = command.user_id.clone();
        self.submit(command).await.map_err(|e| {
            error!(user_id = %user_id, error = %e, "Order creation failed");
            PaymentError::OrderCreationError(Box::new(e))
        })
    }

    async fn submit(&self, command: CreateOrder) -> Result<OrderCreated> {
        let request = GatewayOrderRequest {
            amount: command.amount_minor,
            currency: CURRENCY.to_string(),
            receipt: new_receipt(),
            notes: OrderNotes {
                user_id: command.user_id.clone(),
                credits: command.credits.to_string(),
                package_id: command.package_id.clone(),
            },
        };
        let gateway_order = self.gateway.create_order(&request).await?;

        let order = Order::new(
            gateway_order.id.clone(),
            command.user_id,
            command.amount,
            command.credits,
            command.package_id,
            Utc::now(),
        );
        self.store.insert_order(order).await?;

        info!(
            order_id = %gateway_order.id,
            receipt = %request.receipt,
            credits = command.credits,
            "Order created"
        );

        Ok(OrderCreated {
            order_id: gateway_order.id,
            amount: gateway_order.amount,
        })
    }
}

/// Gateway receipts are capped at 40 characters.
fn new_receipt() -> String {
    format!("rcpt_{}", Uuid::new_v4().simple())
}
