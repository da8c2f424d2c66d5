use super::env_parse;
use anyhow::Result;
use std::env;

const MIN_SECRET_LEN: usize = 32;
const DEFAULT_SESSION_SECS: u64 = 86_400;
/// Festival shifts are long, but a leaked token must not live for weeks.
const MAX_SESSION_SECS: u64 = 7 * 86_400;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Session lifetime in seconds.
    pub session_expiry: u64,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable must be set"))?;

        Self::new(
            secret,
            env_parse("JWT_SESSION_EXPIRATION", DEFAULT_SESSION_SECS),
        )
    }

    pub fn new(secret: String, session_expiry: u64) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters",
                MIN_SECRET_LEN
            ));
        }
        if session_expiry == 0 || session_expiry > MAX_SESSION_SECS {
            return Err(anyhow::anyhow!(
                "JWT_SESSION_EXPIRATION must be between 1 and {} seconds",
                MAX_SESSION_SECS
            ));
        }

        Ok(Self {
            secret,
            session_expiry,
        })
    }
}
