//! In-memory transport for fetcher and aggregator tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use curio_core::error::AppError;
use curio_core::models::Item;
use reqwest::Url;
use serde_json::Value;

use crate::transport::JsonTransport;

#[derive(Clone)]
pub enum Canned {
    Json(Value),
    Status(u16),
    Unreachable,
    Slow(Duration, Value),
}

/// Answers requests from a URL-keyed table and records every URL requested.
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<HashMap<String, Canned>>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, canned: Canned) {
        self.responses
            .lock()
            .expect("poisoned mutex")
            .insert(url.to_string(), canned);
    }

    pub fn json(&self, url: &str, body: Value) {
        self.respond(url, Canned::Json(body));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("poisoned mutex").clone()
    }
}

#[async_trait]
impl JsonTransport for FakeTransport {
    async fn get_json(&self, url: &Url) -> Result<Value, AppError> {
        self.calls
            .lock()
            .expect("poisoned mutex")
            .push(url.to_string());

        let canned = self
            .responses
            .lock()
            .expect("poisoned mutex")
            .get(url.as_str())
            .cloned();

        match canned {
            Some(Canned::Json(body)) => Ok(body),
            Some(Canned::Slow(delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(body)
            }
            Some(Canned::Status(code)) => {
                Err(AppError::ClientError(format!("HTTP {} from {}", code, url.path())))
            }
            Some(Canned::Unreachable) => {
                Err(AppError::NetworkError("Connection failed: refused".to_string()))
            }
            None => Err(AppError::ClientError(format!("HTTP 404 from {}", url.path()))),
        }
    }
}

pub fn ids(items: &[Item]) -> Vec<i64> {
    items.iter().map(|item| item.article_id).collect()
}
