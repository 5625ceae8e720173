use crate::error::PanelError;
use std::time::Duration;
use url::Url;

/// Path of the socket endpoint on the page's own host.
pub const WS_PATH: &str = "/ws";

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub endpoint: Url,
    /// Fixed wait between reconnect attempts. No backoff is applied.
    pub reconnect_delay: Duration,
    /// Delay between expanding the camera dropdown and showing its entries.
    pub reveal_delay: Duration,
    pub channel_capacity: usize,
}

impl PanelConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            reveal_delay: DEFAULT_REVEAL_DELAY,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }
}

/// Derives the socket endpoint from the URL the panel page was served from:
/// same host and port, `ws` for `http` and `wss` for `https`, path `/ws`.
pub fn endpoint_from_page_url(page: &str) -> Result<Url, PanelError> {
    let mut url = Url::parse(page).map_err(|e| invalid(page, e.to_string()))?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => return Err(invalid(page, format!("unsupported page scheme {other:?}"))),
    };
    if url.host_str().is_none() {
        return Err(invalid(page, "page URL has no host".to_string()));
    }
    url.set_scheme(scheme)
        .map_err(|_| invalid(page, format!("cannot switch scheme to {scheme}")))?;
    url.set_path(WS_PATH);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Accepts a direct `ws://` or `wss://` endpoint URL.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, PanelError> {
    let url = Url::parse(endpoint).map_err(|e| invalid(endpoint, e.to_string()))?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(invalid(endpoint, format!("expected ws or wss, got {other:?}"))),
    }
}

fn invalid(url: &str, reason: String) -> PanelError {
    PanelError::InvalidEndpoint {
        url: url.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_page_maps_to_ws() {
        let url = endpoint_from_page_url("http://rig.local:8080/index.html?x=1#top").unwrap();
        assert_eq!(url.as_str(), "ws://rig.local:8080/ws");
    }

    #[test]
    fn secure_page_maps_to_wss() {
        let url = endpoint_from_page_url("https://rig.example.com/").unwrap();
        assert_eq!(url.as_str(), "wss://rig.example.com/ws");
    }

    #[test]
    fn non_http_page_is_rejected() {
        assert!(matches!(
            endpoint_from_page_url("file:///tmp/root.html"),
            Err(PanelError::InvalidEndpoint { .. })
        ));
        assert!(endpoint_from_page_url("not a url").is_err());
    }

    #[test]
    fn direct_endpoint_must_be_a_socket_url() {
        assert!(parse_endpoint("ws://127.0.0.1:9001/ws").is_ok());
        assert!(parse_endpoint("wss://rig.example.com/ws").is_ok());
        assert!(parse_endpoint("http://127.0.0.1/ws").is_err());
    }

    #[test]
    fn defaults_match_the_panel_timings() {
        let config = PanelConfig::new(parse_endpoint("ws://localhost/ws").unwrap());
        assert_eq!(config.reconnect_delay, Duration::from_millis(100));
        assert_eq!(config.reveal_delay, Duration::from_millis(500));

        let config = config
            .with_reconnect_delay(Duration::from_secs(1))
            .with_reveal_delay(Duration::ZERO);
        assert_eq!(config.reconnect_delay, Duration::from_secs(1));
        assert_eq!(config.reveal_delay, Duration::ZERO);
    }
}
