//! Client configuration

use std::time::Duration;

/// UI variant discriminator sent when opening the notification stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientRole {
    /// Staff-facing management dashboard
    #[default]
    Staff,
    /// Customer-facing display board
    Display,
}

impl std::fmt::Display for ClientRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientRole::Staff => write!(f, "staff"),
            ClientRole::Display => write!(f, "display"),
        }
    }
}

/// Client configuration for connecting to the Waitline backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "https://api.waitline.example")
    pub base_url: String,

    /// Auth token for authenticated endpoints
    pub token: Option<String>,

    /// UI variant, appended to the notification stream query
    pub role: ClientRole,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Sync-token polling interval
    pub poll_interval: Duration,

    /// Trailing debounce window for coalescing push notifications
    pub debounce_window: Duration,

    /// Fixed delay before re-establishing a dropped notification stream
    pub reconnect_delay: Duration,
}

impl ClientConfig {
    /// Create a new client configuration with default timings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            role: ClientRole::default(),
            timeout: 30,
            poll_interval: Duration::from_secs(5),
            debounce_window: Duration::from_millis(500),
            reconnect_delay: Duration::from_secs(3),
        }
    }

    /// Set the auth token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the UI role
    pub fn with_role(mut self, role: ClientRole) -> Self {
        self.role = role;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the polling interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the debounce window
    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    /// Set the reconnect delay
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.debounce_window, Duration::from_millis(500));
        assert_eq!(config.reconnect_delay, Duration::from_secs(3));
        assert_eq!(config.role, ClientRole::Staff);
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("https://api.example.com")
            .with_token("tok-1")
            .with_role(ClientRole::Display)
            .with_poll_interval(Duration::from_secs(10));

        assert_eq!(config.token.as_deref(), Some("tok-1"));
        assert_eq!(config.role, ClientRole::Display);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
    }
}
