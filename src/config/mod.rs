use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Twilio account SID. Carrier lookup is disabled when absent.
    pub twilio_account_sid: Option<String>,

    /// Twilio auth token. Carrier lookup is disabled when absent.
    pub twilio_auth_token: Option<String>,

    /// Delay before each line check contacts the provider, in milliseconds.
    /// Models dial latency so pollers can observe the in-progress state.
    #[serde(default = "default_dispatch_delay_ms")]
    pub dispatch_delay_ms: u64,

    /// Per-request timeout for provider lookups, in seconds.
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_dispatch_delay_ms() -> u64 {
    1000
}

fn default_lookup_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Both credentials must be present for the provider to be usable.
    pub fn twilio_credentials(&self) -> Option<(&str, &str)> {
        match (&self.twilio_account_sid, &self.twilio_auth_token) {
            (Some(sid), Some(token)) => Some((sid.as_str(), token.as_str())),
            _ => None,
        }
    }
}
