mod rate;
mod send_emails;
mod subscribe;

pub use rate::rate;
pub use send_emails::send_emails;
pub use subscribe::subscribe;

/// Health probe.
pub async fn kenobi() -> &'static str {
    "Hello there"
}
