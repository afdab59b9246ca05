//! Batch dispatch of the current rate to every stored subscriber.
//!
//! Sends are issued one at a time, one message per recipient. A failed send is logged
//! and skipped: the batch never aborts and nothing is retried.

use tracing::{error, info};

use crate::{
    email_client::EmailSender, rate_client::RateQuote, store::SubscriberStore,
    templ_manager::TemplateManager, web::types::ValidEmail,
};

/// The outcome of a batch.
#[derive(Debug, Default)]
pub struct SendReport {
    /// Every stored address, in store order, whether the send succeeded or not.
    pub attempted: Vec<String>,
    /// The subset of `attempted` that could not be delivered. Only ever logged.
    pub failed: Vec<String>,
}

pub fn subject(symbol: &str) -> String {
    format!("A Galaxy Far, Far Away From The Current {symbol} Exchange Rate")
}

/// Renders one shared body for `quote` and sends it to every subscriber in `store`.
/// Fails only if the subscribers can't be read or the body can't be rendered,
/// both of which happen before the first send.
#[tracing::instrument(name = "Sending rate to subscribers", skip_all, fields(rate = quote.price))]
pub async fn send_rate(
    store: &SubscriberStore,
    templ_mgr: &TemplateManager,
    email_client: &dyn EmailSender,
    quote: &RateQuote,
) -> Result<SendReport> {
    let subscribers = store.subscribers().await?;
    let html_content = templ_mgr.render_rate_email(quote)?;
    let subject = subject(&quote.symbol);

    let mut report = SendReport::default();
    for subscriber in subscribers {
        let sent = match ValidEmail::parse(&subscriber.email) {
            Ok(recipient) => email_client
                .send_email(&recipient, &subject, &html_content)
                .await
                .map_err(|er| er.to_string()),
            // NOTE: we validate before we store, so this only happens if the file was edited by hand.
            Err(er) => Err(format!(
                "THIS IS A BUG: a stored subscriber has an invalid email address: {er}"
            )),
        };

        match sent {
            Ok(()) => info!("successfully sent email to {}", subscriber.email),
            Err(er) => {
                error!("failed to send email to {}: {er}", subscriber.email);
                report.failed.push(subscriber.email.clone());
            }
        }
        report.attempted.push(subscriber.email);
    }

    info!(
        "Batch done: {} attempted, {} failed",
        report.attempted.len(),
        report.failed.len()
    );
    Ok(report)
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("store error: {0}")]
    Store(#[from] crate::store::StoreError),
    #[error("templating error: {0}")]
    Tera(#[from] tera::Error),
}
