// src/config/address.rs

use std::fmt;

use reqwest::Url;

use crate::errors::{Result, ServectlError};

/// Base address of the managed server, resolved once from `host` and the
/// profile's `PORT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    url: Url,
}

impl ServerAddress {
    /// Resolve the address.
    ///
    /// - `host` that parses as a URL with an authority (`https://example.com/app`)
    ///   is kept as-is; only its port is replaced.
    /// - Anything else (`localhost`, `10.0.0.2`, `example.com:3000`) is taken as
    ///   a host under `http://`, and the port is replaced the same way.
    pub fn resolve(host: &str, port: u16) -> Result<Self> {
        let host = host.trim();
        let mut url = match Url::parse(host) {
            Ok(url) if url.has_host() && !url.cannot_be_a_base() => url,
            _ => Url::parse(&format!("http://{host}")).map_err(|e| {
                ServectlError::ConfigError(format!("invalid host '{host}': {e}"))
            })?,
        };

        url.set_port(Some(port)).map_err(|()| {
            ServectlError::ConfigError(format!("cannot set port {port} on '{host}'"))
        })?;

        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Absolute URL for an endpoint path such as `/test-shutdown`.
    ///
    /// A leading `/` replaces any path carried by `host`, matching how the
    /// server mounts its control endpoints at the root.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.url.join(path).map_err(|e| {
            ServectlError::ConfigError(format!("cannot build endpoint '{path}' on {}: {e}", self.url))
        })
    }

    /// Port actually used for connections, including scheme defaults
    /// (the URL drops an explicit `:80` on `http`).
    pub fn port(&self) -> Option<u16> {
        self.url.port_or_known_default()
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
