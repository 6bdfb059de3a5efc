//! HTTP server configuration loaded from the environment.

use std::env;
use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use tracing::{info, warn};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Construct a server configuration from explicit values.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
        }
    }

    /// Load configuration from the environment.
    ///
    /// - `SESSION_KEY_FILE` points at the cookie signing key
    ///   (default `/var/run/secrets/session_key`). Debug builds, or
    ///   `SESSION_ALLOW_EPHEMERAL=1`, fall back to a generated key.
    /// - `SESSION_COOKIE_SECURE=0` disables the `Secure` cookie flag.
    /// - `BIND_ADDR` overrides the listen address (default `127.0.0.1:8080`).
    ///
    /// # Errors
    /// Fails when the key file is unreadable outside of development mode.
    pub fn from_env() -> std::io::Result<Self> {
        let key = load_session_key()?;
        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .map(|v| v != "0")
            .unwrap_or(true);
        let bind_addr = load_with_default("BIND_ADDR", "127.0.0.1:8080")?;

        Ok(Self::new(key, cookie_secure, SameSite::Lax, bind_addr))
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

fn load_with_default<T>(name: &str, default: &str) -> std::io::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(name).unwrap_or_else(|_| {
        info!("{name} not set, using default: {default}");
        default.to_owned()
    });
    raw.parse()
        .map_err(|e| std::io::Error::other(format!("invalid {name} value {raw}: {e}")))
}
