use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

use crate::helpers::TestApp;

async fn subscribe_all(app: &TestApp, emails: &[&str]) -> Result<()> {
    for email in emails {
        let res = app
            .post_subscribe(&format!("email={}", email.replace('@', "%40")))
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn send_emails_lists_every_subscriber_even_when_one_fails() -> Result<()> {
    let emails = ["a@example.com", "b@example.com", "c@example.com"];
    let app = TestApp::spawn_failing_for(&["b@example.com"]).await?;
    app.mock_rate("1733140.5").await;
    subscribe_all(&app, &emails).await?;

    let res = app.post_send_emails().await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "E-mails sent");
    assert_eq!(body["emails"], serde_json::json!(emails));

    assert_eq!(app.sent_to(), emails);
    let sent = app.sent.lock().expect("poisoned");
    assert!(sent.iter().all(|(_, subject)| subject.contains("BTCUAH")));

    Ok(())
}

#[tokio::test]
async fn send_emails_with_no_subscribers_is_empty_list() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_rate("42.5").await;

    let res = app.post_send_emails().await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["emails"], serde_json::json!([]));
    assert!(app.sent_to().is_empty());

    Ok(())
}

#[tokio::test]
async fn send_emails_rate_failure_is_500_and_sends_nothing() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_rate_error("Invalid symbol.").await;
    subscribe_all(&app, &["a@example.com"]).await?;

    let res = app.post_send_emails().await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert!(body["error"].is_string());
    assert!(app.sent_to().is_empty());

    Ok(())
}

#[tokio::test]
async fn send_emails_malformed_store_is_500_and_sends_nothing() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_rate("42.5").await;
    subscribe_all(&app, &["a@example.com"]).await?;
    std::fs::write(&app.store_path, "{not json")?;

    let res = app.post_send_emails().await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.sent_to().is_empty());

    Ok(())
}
