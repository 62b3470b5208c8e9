use crate::domain::transaction::DEFAULT_MAX_ATTEMPTS;
use crate::error::{PaymentError, Result};
use std::fmt;
use std::path::PathBuf;

/// Gateway shared secret. Never printed, not even in debug output.
#[derive(Clone)]
pub struct KeySecret(String);

impl KeySecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for KeySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeySecret(***)")
    }
}

#[derive(Debug, Clone)]
pub struct GatewayCredentials {
    pub key_id: String,
    pub key_secret: KeySecret,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayMode {
    /// Orders are created through the Razorpay REST API.
    Razorpay { base_url: String },
    /// Orders are minted in-process. Payments still verify against the secret.
    Local,
}

/// Process-wide settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: GatewayCredentials,
    pub gateway: GatewayMode,
    pub db_path: Option<PathBuf>,
    pub max_transaction_attempts: u32,
}

impl Settings {
    pub fn new(credentials: GatewayCredentials, gateway: GatewayMode) -> Self {
        Self {
            credentials,
            gateway,
            db_path: None,
            max_transaction_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.credentials.key_secret.is_empty() {
            return Err(PaymentError::ValidationError(
                "Gateway key secret must not be empty".to_string(),
            ));
        }
        if let GatewayMode::Razorpay { base_url } = &self.gateway {
            if self.credentials.key_id.trim().is_empty() {
                return Err(PaymentError::ValidationError(
                    "Gateway key id is required unless --local-gateway is set".to_string(),
                ));
            }
            if base_url.trim().is_empty() {
                return Err(PaymentError::ValidationError(
                    "Gateway URL must not be empty".to_string(),
                ));
            }
        }
        if self.max_transaction_attempts == 0 {
            return Err(PaymentError::ValidationError(
                "max transaction attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
