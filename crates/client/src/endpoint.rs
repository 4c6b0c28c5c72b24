//! API origin selection.
//!
//! The origin is an explicit value injected when the client is built. The
//! hostname table in [`ApiOrigin::for_host`] reproduces how deployments
//! without configuration picked their backend: the static site and tunnel
//! front ends talk to the tunnel backend, everything else to a local one.

use url::Url;

/// Backend origin used for local development.
pub const LOCAL_ORIGIN: &str = "http://127.0.0.1:8000/api";

/// Public tunnel forwarding to a locally run backend.
pub const TUNNEL_ORIGIN: &str = "https://99e4adbd0611.ngrok-free.app/api";

/// Static-site host that is always served by the tunnel backend.
const PAGES_HOST: &str = "marzok16.github.io";

/// Host fragments identifying tunnel front ends.
const TUNNEL_HOST_PATTERNS: [&str; 2] = ["loca.lt", "ngrok-free.app"];

/// Errors that can occur when parsing an [`ApiOrigin`].
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// Not a URL.
    #[error("invalid API origin {0:?}: {1}")]
    InvalidUrl(String, url::ParseError),
    /// Scheme other than http or https.
    #[error("API origin {0:?} must use http or https")]
    UnsupportedScheme(String),
    /// URL without a host.
    #[error("API origin {0:?} has no host")]
    MissingHost(String),
}

/// Base URL every request path is appended to (e.g. `http://127.0.0.1:8000/api`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiOrigin {
    base: String,
    tunnel: bool,
}

impl ApiOrigin {
    /// Parse an origin from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error unless `s` is an absolute http(s) URL with a host.
    pub fn parse(s: &str) -> Result<Self, EndpointError> {
        let url = Url::parse(s.trim()).map_err(|e| EndpointError::InvalidUrl(s.to_owned(), e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EndpointError::UnsupportedScheme(s.to_owned()));
        }
        let host = url
            .host_str()
            .ok_or_else(|| EndpointError::MissingHost(s.to_owned()))?;
        let tunnel = is_tunnel_host(host);

        Ok(Self {
            base: url.as_str().trim_end_matches('/').to_owned(),
            tunnel,
        })
    }

    /// The local development backend.
    #[must_use]
    pub fn local() -> Self {
        Self {
            base: LOCAL_ORIGIN.to_owned(),
            tunnel: false,
        }
    }

    /// The tunnel backend.
    #[must_use]
    pub fn tunnel() -> Self {
        Self {
            base: TUNNEL_ORIGIN.to_owned(),
            tunnel: true,
        }
    }

    /// Pick the backend for a front end served from `host`.
    ///
    /// The static-site host and any tunnel host map to the tunnel origin;
    /// every other host maps to the local origin.
    #[must_use]
    pub fn for_host(host: &str) -> Self {
        let host = host.trim().to_ascii_lowercase();
        if host == PAGES_HOST || TUNNEL_HOST_PATTERNS.iter().any(|p| host.contains(p)) {
            Self::tunnel()
        } else {
            Self::local()
        }
    }

    /// Whether requests must carry the tunnel bypass header.
    #[must_use]
    pub const fn is_tunnel(&self) -> bool {
        self.tunnel
    }

    /// The origin without a trailing slash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Absolute URL for a request path such as `/products/dashboard/stats/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined string is not a valid URL.
    pub fn url_for(&self, path: &str) -> Result<Url, url::ParseError> {
        if path.starts_with('/') {
            Url::parse(&format!("{}{path}", self.base))
        } else {
            Url::parse(&format!("{}/{path}", self.base))
        }
    }
}

impl Default for ApiOrigin {
    fn default() -> Self {
        Self::local()
    }
}

impl std::fmt::Display for ApiOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base)
    }
}

fn is_tunnel_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    TUNNEL_HOST_PATTERNS.iter().any(|p| host.ends_with(p))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tunnel_hosts_resolve_to_tunnel_origin() {
        for host in [
            "marzok16.github.io",
            "shop.loca.lt",
            "brave-fox.loca.lt",
            "abc123.ngrok-free.app",
            "ngrok-free.app",
        ] {
            let origin = ApiOrigin::for_host(host);
            assert_eq!(origin.as_str(), TUNNEL_ORIGIN, "host {host}");
            assert!(origin.is_tunnel());
        }
    }

    #[test]
    fn test_other_hosts_resolve_to_local_origin() {
        for host in [
            "localhost",
            "127.0.0.1",
            "github.io",
            "other.github.io",
            "example.com",
            "",
        ] {
            let origin = ApiOrigin::for_host(host);
            assert_eq!(origin.as_str(), LOCAL_ORIGIN, "host {host}");
            assert!(!origin.is_tunnel());
        }
    }

    #[test]
    fn test_host_match_is_case_insensitive() {
        assert!(ApiOrigin::for_host("Marzok16.GitHub.io").is_tunnel());
    }

    #[test]
    fn test_parse_trims_trailing_slash() {
        let origin = ApiOrigin::parse("https://api.example.com/api/").unwrap();
        assert_eq!(origin.as_str(), "https://api.example.com/api");
        assert!(!origin.is_tunnel());
    }

    #[test]
    fn test_parse_detects_tunnel() {
        assert!(ApiOrigin::parse("https://x.ngrok-free.app/api").unwrap().is_tunnel());
    }

    #[test]
    fn test_parse_rejects_bad_origins() {
        assert!(matches!(
            ApiOrigin::parse("not a url"),
            Err(EndpointError::InvalidUrl(..))
        ));
        assert!(matches!(
            ApiOrigin::parse("ftp://files.example.com"),
            Err(EndpointError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_url_for_joins_path() {
        let url = ApiOrigin::local()
            .url_for("/products/dashboard/stats/")
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/products/dashboard/stats/");
        let url = ApiOrigin::local().url_for("users/admin/users/").unwrap();
        assert_eq!(url.path(), "/api/users/admin/users/");
    }
}
