//! The configuration structs used to build the AppConfig, and their impls.
use std::path::PathBuf;

use secrecy::SecretString;
use serde::Deserialize;
use strum_macros::AsRefStr;

use crate::config::{ConfigError, ConfigResult};
use crate::web::types::ValidEmail;

// ###################################
// ->   STRUCTS
// ###################################
#[derive(AsRefStr, Debug, Clone, Copy)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub rate_config: RateConfig,
    pub store_config: StoreConfig,
    pub email_config: EmailConfig,
}

#[derive(Deserialize, Clone, Debug)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
}

/// Where the quotes come from.
#[derive(Deserialize, Clone, Debug)]
pub struct RateConfig {
    pub base_url: String,
    /// The trading pair, e.g. `BTCUAH`.
    pub symbol: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StoreConfig {
    /// The JSON file holding the subscribers.
    pub path: PathBuf,
}

/// The sender identity and the SMTP relay it authenticates against.
#[derive(Deserialize, Clone, Debug)]
pub struct EmailConfig {
    pub sender_name: String,
    pub sender_addr: String,
    pub sender_password: SecretString,
    pub smtp_host: String,
    pub smtp_port: u16,
}

// ###################################
// ->   IMPLs
// ###################################
impl EmailConfig {
    pub fn valid_sender(&self) -> ConfigResult<ValidEmail> {
        let addr = ValidEmail::parse(&self.sender_addr)
            .map_err(|er| ConfigError::InvalidEmail(er.to_string()))?;
        Ok(addr)
    }
}

// ###################################
// ->   TRY FROMs
// ###################################
impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(Self::Error::StringToEnvironmentFail(value)),
        }
    }
}
