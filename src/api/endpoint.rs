// ABOUTME: salt-api endpoint coordinates and route constants.
// ABOUTME: Parses "scheme://host" plus port into a validated endpoint.

use super::error::{ApiError, Result};
use hyper::Uri;
use std::fmt;

/// Route for exchanging credentials for a session token.
pub const LOGIN_PATH: &str = "/login";
/// Route for remote execution. The API root accepts lowstate commands directly.
pub const RUN_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// Validated location of a salt-api server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: Scheme,
    host: String,
    port: u16,
}

impl Endpoint {
    /// Parse a hostname with scheme (e.g. `https://salt.example.com`) and a port.
    pub fn parse(hostname: &str, port: &str) -> Result<Self> {
        let port_num = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ApiError::invalid_endpoint(hostname, format!("invalid port: {port}")))?;

        let base = hostname.trim().trim_end_matches('/');
        let uri: Uri = base
            .parse()
            .map_err(|e| ApiError::invalid_endpoint(hostname, format!("{e}")))?;

        let scheme = match uri.scheme_str() {
            Some(s) if s.eq_ignore_ascii_case("https") => Scheme::Https,
            Some(s) if s.eq_ignore_ascii_case("http") => Scheme::Http,
            Some(s) => {
                return Err(ApiError::invalid_endpoint(
                    hostname,
                    format!("unsupported scheme: {s}"),
                ));
            }
            None => {
                return Err(ApiError::invalid_endpoint(
                    hostname,
                    "missing scheme (expected http:// or https://)",
                ));
            }
        };

        let host = match uri.host() {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => return Err(ApiError::invalid_endpoint(hostname, "missing host")),
        };

        if !matches!(uri.path(), "" | "/") {
            return Err(ApiError::invalid_endpoint(
                hostname,
                "hostname must not contain a path",
            ));
        }

        if uri.port().is_some() {
            return Err(ApiError::invalid_endpoint(
                hostname,
                "port must be given separately, not in the hostname",
            ));
        }

        Ok(Self {
            scheme,
            host,
            port: port_num,
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Host as it appears in a URL (IPv6 addresses keep their brackets).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Host suitable for DNS resolution and TLS server names.
    pub fn bare_host(&self) -> &str {
        self.host.trim_start_matches('[').trim_end_matches(']')
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_tls(&self) -> bool {
        self.scheme == Scheme::Https
    }

    /// `host:port`, used for the Host header.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Full URL for a route on this endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self, path)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme.as_str(), self.host, self.port)
    }
}
