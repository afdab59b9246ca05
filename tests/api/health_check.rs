use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

use crate::helpers::TestApp;

#[tokio::test]
async fn kenobi_says_hello_there() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.http_client.get(app.url("/api/kenobi")).send().await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await?, "Hello there");

    Ok(())
}

#[tokio::test]
async fn unknown_path_is_not_found() -> Result<()> {
    let app = TestApp::spawn().await?;

    for route in ["/api/obi-wan", "/", "/rate"] {
        let res = app.http_client.get(app.url(route)).send().await?;

        assert_eq!(res.status(), StatusCode::NOT_FOUND, "route: {route}");
        assert!(res.headers().contains_key("x-request-id"));
        let body: Value = res.json().await?;
        let msg = body["error"].as_str().unwrap_or_default();
        assert!(msg.contains(route), "unexpected error body: {body}");
    }

    Ok(())
}
