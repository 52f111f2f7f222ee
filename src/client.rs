use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::session::Message;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    conversation: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    response: String,
}

/// One request, one reply. No retry, no timeout, no streaming.
#[async_trait]
pub trait ReplyClient: Send + Sync {
    async fn reply(&self, model: &str, conversation: &[Message]) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpReplyClient {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpReplyClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ReplyClient for HttpReplyClient {
    async fn reply(&self, model: &str, conversation: &[Message]) -> Result<String> {
        let body = ChatRequest { model, conversation };
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            anyhow::bail!("chat endpoint returned {}", resp.status());
        }
        let reply: ChatReply = resp.json().await?;
        debug!(chars = reply.response.len(), "reply received");
        Ok(reply.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    async fn serve(app: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/chat")).unwrap()
    }

    #[tokio::test]
    async fn sends_wire_format_and_returns_reply_text() {
        let captured: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let cap = captured.clone();
        let app = Router::new().route(
            "/chat",
            post(move |Json(body): Json<Value>| {
                let cap = cap.clone();
                async move {
                    *cap.lock().unwrap() = Some(body);
                    Json(json!({"response": "Hi"}))
                }
            }),
        );
        let endpoint = serve(app).await;

        let client = HttpReplyClient::new(endpoint);
        let reply = client
            .reply("VF-4", &[Message::user("Hello")])
            .await
            .unwrap();
        assert_eq!(reply, "Hi");

        let body = captured.lock().unwrap().take().unwrap();
        assert_eq!(
            body,
            json!({
                "model": "VF-4",
                "conversation": [{"role": "user", "content": "Hello"}],
            })
        );
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let app = Router::new().route(
            "/chat",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let endpoint = serve(app).await;

        let err = HttpReplyClient::new(endpoint)
            .reply("VF-4", &[Message::user("Hello")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"), "got: {err}");
    }

    #[tokio::test]
    async fn undecodable_body_is_an_error() {
        let app = Router::new().route("/chat", post(|| async { "not json" }));
        let endpoint = serve(app).await;

        let result = HttpReplyClient::new(endpoint)
            .reply("VF-4", &[Message::user("Hello")])
            .await;
        assert!(result.is_err());
    }
}
