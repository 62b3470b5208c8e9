use crate::config::GatewayCredentials;
use crate::domain::ports::{GatewayOrder, GatewayOrderRequest, PaymentGateway};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.razorpay.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Razorpay Orders API client.
///
/// Authenticates with HTTP basic auth (key id / key secret). Failed calls are
/// reported once; retrying is left to the caller.
pub struct RazorpayGateway {
    client: reqwest::Client,
    base_url: String,
    credentials: GatewayCredentials,
}

impl RazorpayGateway {
    pub fn new(credentials: GatewayCredentials, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PaymentError::GatewayError(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn orders_url(&self) -> String {
        format!("{}/orders", self.base_url)
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder> {
        debug!(receipt = %request.receipt, amount = request.amount, "Creating gateway order");

        let response = self
            .client
            .post(self.orders_url())
            .basic_auth(
                &self.credentials.key_id,
                Some(self.credentials.key_secret.expose()),
            )
            .json(request)
            .send()
            .await
            .map_err(|e| PaymentError::GatewayError(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::GatewayError(format!(
                "Gateway returned {}: {}",
                status, body
            )));
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| PaymentError::GatewayError(format!("Malformed gateway response: {}", e)))
    }
}
