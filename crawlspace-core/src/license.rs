//! Thin client for the subscription backend that gates site-wide crawls.
//!
//! Only the wire interface lives here: token verification and subscription
//! lookup. Payment processing, JWT issuance and persistence all belong to
//! the backend.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Response of `GET /api/verify-subscription/:customerId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub subscribed: bool,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Response of `GET /api/verify-token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenVerification {
    pub valid: bool,
}

/// Locally generated customer handle, created once and reused.
pub fn generate_customer_id() -> String {
    format!("cust_{}", Uuid::new_v4().simple())
}

/// Ask the backend whether a bearer token is still good.
/// A non-success status counts as invalid, not as an error.
pub async fn verify_token(api_base: &str, token: &str) -> Result<bool, String> {
    let url = format!("{}/api/verify-token", api_base.trim_end_matches('/'));
    debug!("Verifying token against {}", url);

    let response = reqwest::Client::new()
        .get(&url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| format!("Token verification request failed: {}", e))?;

    if !response.status().is_success() {
        return Ok(false);
    }

    let verification: TokenVerification = response
        .json()
        .await
        .map_err(|e| format!("Malformed verification response: {}", e))?;

    Ok(verification.valid)
}

/// Look up a customer's subscription. A 404 means no subscription at all.
pub async fn check_subscription(
    api_base: &str,
    customer_id: &str,
) -> Result<SubscriptionStatus, String> {
    let url = format!(
        "{}/api/verify-subscription/{}",
        api_base.trim_end_matches('/'),
        customer_id
    );
    debug!("Checking subscription at {}", url);

    let response = reqwest::Client::new()
        .get(&url)
        .send()
        .await
        .map_err(|e| format!("Subscription check request failed: {}", e))?;

    if response.status().as_u16() == 404 {
        return Ok(SubscriptionStatus {
            subscribed: false,
            expires_at: None,
            token: None,
        });
    }
    if !response.status().is_success() {
        return Err(format!(
            "Subscription check failed with status {}",
            response.status()
        ));
    }

    response
        .json()
        .await
        .map_err(|e| format!("Malformed subscription response: {}", e))
}
