/// Utility functions for building URLs for API requests
/// Supports both traditional host:port format and modern base URL format
use url::Url;

/// Build API URL from either base_url or host/port combination
///
/// If base_url is provided, it takes precedence and should include the protocol.
/// Otherwise, constructs URL from host and port using http as default protocol.
pub fn build_api_url(base_url: Option<&str>, host: &str, port: u16, path: &str) -> String {
    if let Some(base) = base_url {
        format!("{}{}", base.trim_end_matches('/'), path)
    } else if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}{}", host.trim_end_matches('/'), path)
    } else {
        format!("http://{}:{}{}", host, port, path)
    }
}

/// Join an endpoint path (with optional query) onto the service root.
/// A path prefix on the root is kept, so the service can sit behind a proxy.
pub fn endpoint_url(root: &str, path: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("{}{}", root.trim_end_matches('/'), path))
}
