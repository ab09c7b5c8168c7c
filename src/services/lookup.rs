use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// What the provider reports for a phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    CarrierPresent,
    CarrierAbsent,
}

/// Carrier lookup provider boundary.
///
/// The verifier only sees this trait; tests substitute scripted
/// implementations and production uses [`TwilioLookupClient`].
#[async_trait]
pub trait CarrierLookup: Send + Sync {
    async fn lookup(&self, number: &str) -> Result<LookupOutcome, LookupError>;
}

/// Client for the Twilio Lookup v1 carrier endpoint.
pub struct TwilioLookupClient {
    http: Client,
    account_sid: String,
    auth_token: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    carrier: Option<serde_json::Value>,
}

impl TwilioLookupClient {
    pub fn new(
        account_sid: &str,
        auth_token: &str,
        timeout: Duration,
    ) -> Result<Self, LookupError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
        })
    }
}

#[async_trait]
impl CarrierLookup for TwilioLookupClient {
    async fn lookup(&self, number: &str) -> Result<LookupOutcome, LookupError> {
        let url = format!("https://lookups.twilio.com/v1/PhoneNumbers/{number}");

        let response = self
            .http
            .get(&url)
            .query(&[("Type", "carrier")])
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let parsed: LookupResponse = serde_json::from_slice(&body)?;

        // A populated carrier object means the line has a live carrier.
        match parsed.carrier {
            Some(carrier) if !carrier.is_null() => Ok(LookupOutcome::CarrierPresent),
            _ => Ok(LookupOutcome::CarrierAbsent),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Lookup request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse lookup response: {0}")]
    Parse(#[from] serde_json::Error),
}
