use std::env;

use dlab_common::Secret;
use log::*;
use rand::{distributions::Alphanumeric, Rng};
use razorpay_tools::RazorpayConfig;

use crate::errors::ServerError;

const DEFAULT_DLAB_HOST: &str = "127.0.0.1";
const DEFAULT_DLAB_PORT: u16 = 8080;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// When true, unauthenticated callers may place cash-on-delivery orders. Gateway orders
    /// always require an authenticated customer.
    pub allow_guest_checkout: bool,
    /// Payment gateway configuration, including the verification secret. Handed to the gateway
    /// client whole; no other component reads the secret.
    pub razorpay: RazorpayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DLAB_HOST.to_string(),
            port: DEFAULT_DLAB_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            allow_guest_checkout: false,
            razorpay: RazorpayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("DLAB_HOST").ok().unwrap_or_else(|| DEFAULT_DLAB_HOST.into());
        let port = env::var("DLAB_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for DLAB_PORT. {e} Using the default, {DEFAULT_DLAB_PORT}, \
                         instead."
                    );
                    DEFAULT_DLAB_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_DLAB_PORT);
        let database_url = env::var("DLAB_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ DLAB_DATABASE_URL is not set. Please set it to the URL for the storefront database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to \
                 the default configuration."
            );
            AuthConfig::default()
        });
        let allow_guest_checkout =
            env::var("DLAB_ALLOW_GUEST_CHECKOUT").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        if allow_guest_checkout {
            info!("🪛️ Guest checkout is enabled. Anonymous callers may place cash-on-delivery orders.");
        }
        let razorpay = RazorpayConfig::new_from_env_or_default();
        Self { host, port, database_url, auth, allow_guest_checkout, razorpay }
    }
}

//-------------------------------------------------  AuthConfig  ------------------------------------------------------
/// The shared secret used to verify the HS256 access tokens minted by the user service. The
/// server only ever verifies tokens; it never issues them.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT verification secret has not been set. I'm using a random value for this session, so NO \
             token minted by the user service will validate and every authenticated route will reject its callers. \
             Set DLAB_JWT_SECRET to the secret shared with the user service. 🚨️🚨️🚨️"
        );
        let secret: String = rand::thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("DLAB_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [DLAB_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("DLAB_JWT_SECRET is empty".to_string()));
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}

//-------------------------------------------------  ServerOptions  ---------------------------------------------------
/// The subset of the configuration that request handlers need. Kept small, and free of secrets,
/// so it can be dropped into the application data without ceremony.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub allow_guest_checkout: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { allow_guest_checkout: config.allow_guest_checkout }
    }
}
