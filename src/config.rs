use crate::error::{GatewayError, Result};
use crate::validation::ValidationProfile;
use std::time::Duration;

/// Port used by [`GatewayConfig::from_env`] when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3001;

/// Delay between committing a registration and confirming it.
pub const DEFAULT_CONFIRMATION_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub profile: ValidationProfile,
    pub port: Option<u16>,
    pub host: String,
    pub confirmation_delay: Duration,
}

impl GatewayConfig {
    pub fn new(profile: ValidationProfile) -> Self {
        Self {
            profile,
            port: None,
            host: "127.0.0.1".to_string(),
            confirmation_delay: DEFAULT_CONFIRMATION_DELAY,
        }
    }

    pub fn confirm_password() -> Self {
        Self::new(ValidationProfile::ConfirmPassword)
    }

    pub fn minimum_age() -> Self {
        Self::new(ValidationProfile::MinimumAge)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_confirmation_delay(mut self, delay: Duration) -> Self {
        self.confirmation_delay = delay;
        self
    }

    /// Reads `PORT`, `HOST`, `REGISTRATION_PROFILE` and
    /// `CONFIRMATION_DELAY_MS` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`GatewayConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = match lookup("REGISTRATION_PROFILE") {
            Some(value) => value
                .parse()
                .map_err(|_| invalid("REGISTRATION_PROFILE", value))?,
            None => ValidationProfile::default(),
        };

        let port = match lookup("PORT") {
            Some(value) => value.trim().parse().map_err(|_| invalid("PORT", value))?,
            None => DEFAULT_PORT,
        };

        let mut config = Self::new(profile)
            .with_port(port)
            .with_host(lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()));

        if let Some(value) = lookup("CONFIRMATION_DELAY_MS") {
            let millis: u64 = value
                .trim()
                .parse()
                .map_err(|_| invalid("CONFIRMATION_DELAY_MS", value))?;
            config = config.with_confirmation_delay(Duration::from_millis(millis));
        }

        Ok(config)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::confirm_password()
    }
}

fn invalid(key: &'static str, value: String) -> GatewayError {
    GatewayError::InvalidConfig { key, value }
}
