//! Builds an `AppConfig` from the config files and the environment.
//!
//! Sources are layered with `figment`, later ones overriding earlier ones:
//! `config/base.toml`, `config/{environment}.toml`, `APP_*` env variables
//! (nesting separated by `__`) and finally the legacy `EMAIL_SENDER_*` variables.
//! The resulting config is loaded once in `main` and handed to whoever needs it.
//! Variables come from the process environment only, `.env` files are not read.

mod error;
mod types;

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use tracing::info;

pub use error::{ConfigError, ConfigResult};
pub use types::{AppConfig, EmailConfig, Environment, NetConfig, RateConfig, StoreConfig};

/// Env variables used to configure the sender identity, kept for deployments that already set them.
const SENDER_ENV_VARS: [&str; 3] = [
    "EMAIL_SENDER_NAME",
    "EMAIL_SENDER_ADDRESS",
    "EMAIL_SENDER_PASSWORD",
];

impl AppConfig {
    /// Loads the configuration from the `config` directory inside the current working directory.
    /// The environment is picked with `APP_ENVIRONMENT` and defaults to `local`.
    pub fn load() -> ConfigResult<Self> {
        let base_path = std::env::current_dir()?;
        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()?;

        Self::load_from(base_path.join("config"), environment)
    }

    pub fn load_from(config_dir: impl AsRef<Path>, environment: Environment) -> ConfigResult<Self> {
        let config_dir = config_dir.as_ref();
        info!(
            "{:<20} - Loading the '{}' configuration",
            "config",
            environment.as_ref()
        );
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        let config: AppConfig = Figment::new()
            .merge(Toml::file(config_dir.join("base.toml")))
            .merge(Toml::file(config_dir.join(environment_filename)))
            .merge(Env::prefixed("APP_").split("__"))
            .merge(sender_env())
            .extract()?;

        // Fail early on a sender we could never send from.
        config.email_config.valid_sender()?;

        Ok(config)
    }
}

/// Maps `EMAIL_SENDER_NAME` to `email_config.sender_name` and so on.
/// `EMAIL_SENDER_ADDRESS` ends up in `email_config.sender_addr`.
fn sender_env() -> Env {
    Env::raw().only(&SENDER_ENV_VARS).map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        let field = key
            .trim_start_matches("email_sender_")
            .replace("address", "addr");
        format!("email_config.sender_{field}").into()
    })
}
