use crate::{app, config, email_client, rate_client};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("email client error: {0}")]
    EmailClient(#[from] email_client::Error),
    #[error("rate client error: {0}")]
    RateClient(#[from] rate_client::Error),
    #[error("template manager error: {0}")]
    Templ(#[from] tera::Error),
    #[error("serving error: {0}")]
    Serve(#[from] app::serve::ServeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
