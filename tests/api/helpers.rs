//! Spawns the whole app on a random port, with the rate API mocked and the mailer stubbed.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    sync::{Arc, Mutex, OnceLock},
};

use anyhow::Result;
use async_trait::async_trait;
use ratemailer::{
    email_client::{self, EmailSender},
    init_dbg_tracing,
    rate_client::RateClient,
    store::{self, SubscriberRecord, SubscriberStore},
    templ_manager::TemplateManager,
    web::types::ValidEmail,
    App, AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use uuid::Uuid;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Trying to bind port 0 will trigger an OS scan for an available port
/// which will then be bound to the application.
const TEST_SOCK_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 0);

pub const SYMBOL: &str = "BTCUAH";

fn _init_test_subscriber() {
    static SUBSCRIBER: OnceLock<()> = OnceLock::new();
    SUBSCRIBER.get_or_init(|| {
        init_dbg_tracing();
    });
}

pub type SentLog = Arc<Mutex<Vec<(String, String)>>>;

/// Records every `(recipient, subject)` pair and fails for the recipients in `fail_for`.
pub struct RecordingSender {
    fail_for: Vec<String>,
    sent: SentLog,
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send_email(
        &self,
        recipient: &ValidEmail,
        subject: &str,
        _html_content: &str,
    ) -> email_client::Result<()> {
        self.sent
            .lock()
            .expect("poisoned")
            .push((recipient.to_string(), subject.to_string()));

        if self.fail_for.iter().any(|f| f == recipient.as_ref()) {
            return Err(email_client::Error::Address("refused by the stub".into()));
        }
        Ok(())
    }
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub http_client: reqwest::Client,
    pub rate_server: MockServer,
    pub store_path: PathBuf,
    pub sent: SentLog,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_failing_for(&[]).await
    }

    /// Same as `spawn`, but the mailer refuses to deliver to `fail_for`.
    pub async fn spawn_failing_for(fail_for: &[&str]) -> Result<Self> {
        // _init_test_subscriber();

        let rate_server = MockServer::start().await;
        let store_path = std::env::temp_dir()
            .join(format!("ratemailer-it-{}", Uuid::new_v4()))
            .join("emails.json");

        let sent = SentLog::default();
        let email_client = RecordingSender {
            fail_for: fail_for.iter().map(|s| s.to_string()).collect(),
            sent: sent.clone(),
        };
        let rate_client = RateClient::new(rate_server.uri(), SYMBOL)?;
        let app_state = AppState::new(
            SubscriberStore::new(&store_path),
            TemplateManager::init()?,
            Box::new(rate_client),
            Box::new(email_client),
        );

        let listener = TcpListener::bind(TEST_SOCK_ADDR).await?;
        let addr = listener.local_addr()?;
        info!("Listening on {addr}");

        tokio::spawn(ratemailer::serve(App::new(app_state, listener)));

        Ok(TestApp {
            addr,
            http_client: reqwest::Client::new(),
            rate_server,
            store_path,
            sent,
        })
    }

    pub fn url(&self, route: &str) -> String {
        format!("http://{}{route}", self.addr)
    }

    pub async fn mock_rate(&self, price: &str) {
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .and(query_param("symbol", SYMBOL))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(format!(r#"{{"symbol":"{SYMBOL}","price":"{price}"}}"#)),
            )
            .mount(&self.rate_server)
            .await;
    }

    pub async fn mock_rate_error(&self, msg: &str) {
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(format!(r#"{{"code":-1121,"msg":"{msg}"}}"#)),
            )
            .mount(&self.rate_server)
            .await;
    }

    pub async fn post_subscribe(&self, body: &str) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(self.url("/api/subscribe"))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body.to_string())
            .send()
            .await?;
        Ok(res)
    }

    pub async fn post_send_emails(&self) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(self.url("/api/sendEmails"))
            .send()
            .await?;
        Ok(res)
    }

    pub async fn stored(&self) -> Result<Vec<SubscriberRecord>> {
        Ok(store::load(&self.store_path).await?)
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("poisoned")
            .iter()
            .map(|(to, _)| to.clone())
            .collect()
    }
}
