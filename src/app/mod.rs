pub mod serve;

// re-export
pub use serve::serve;

use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    config::AppConfig,
    email_client::{EmailClient, EmailSender},
    rate_client::{RateClient, RateProvider},
    store::SubscriberStore,
    templ_manager::TemplateManager,
    Result,
};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        let store = SubscriberStore::new(&config.store_config.path);
        info!("{:<20} - {}", "Subscribers file:", store.path().display());
        let tm = TemplateManager::init()?;
        let rate_client = RateClient::from_config(&config.rate_config)?;
        let email_client = EmailClient::new(&config.email_config)?;
        info!(
            "{:<20} - {} via {}:{}",
            "Sending as:",
            email_client.sender(),
            config.email_config.smtp_host,
            config.email_config.smtp_port
        );

        let app_state = AppState::new(store, tm, Box::new(rate_client), Box::new(email_client));

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }
}

pub struct InternalState {
    pub store: SubscriberStore,
    pub templ_mgr: TemplateManager,
    pub rate_client: Box<dyn RateProvider>,
    pub email_client: Box<dyn EmailSender>,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(
        store: SubscriberStore,
        templ_mgr: TemplateManager,
        rate_client: Box<dyn RateProvider>,
        email_client: Box<dyn EmailSender>,
    ) -> Self {
        AppState(Arc::new(InternalState {
            store,
            templ_mgr,
            rate_client,
            email_client,
        }))
    }
}
