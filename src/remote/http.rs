use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use super::{RemoteError, RemoteStore};
use crate::config::RemoteConfig;

/// Reqwest-backed client for the document store.
///
/// Construction never fails: offline-first writes must work on a device
/// that has no sync configured. Operations fail with `NotConfigured` or
/// `NoUser` instead.
pub struct HttpRemoteStore {
    client: reqwest::Client,
    server_url: Option<String>,
    api_key: Option<String>,
    user_id: Option<String>,
}

impl HttpRemoteStore {
    pub fn from_config(config: &RemoteConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            server_url: config
                .server_url
                .as_ref()
                .map(|u| u.trim_end_matches('/').to_string()),
            api_key: config.api_key.clone(),
            user_id: config.user_id.clone(),
        }
    }

    fn credentials(&self) -> Result<(&str, &str), RemoteError> {
        match (self.server_url.as_deref(), self.api_key.as_deref()) {
            (Some(url), Some(key)) => Ok((url, key)),
            _ => Err(RemoteError::NotConfigured),
        }
    }

    fn collection_url(&self, collection: &str) -> Result<String, RemoteError> {
        let (base, _) = self.credentials()?;
        let uid = self.user_id.as_ref().ok_or(RemoteError::NoUser)?;
        Ok(format!("{}/users/{}/{}", base, uid, collection))
    }

    fn check_status(status: StatusCode, url: &str) -> Result<(), RemoteError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(RemoteError::Status(status.as_u16(), url.to_string()))
        }
    }
}

impl RemoteStore for HttpRemoteStore {
    async fn put(&self, collection: &str, id: &str, doc: Value) -> Result<(), RemoteError> {
        let (_, key) = self.credentials()?;
        let url = format!("{}/{}", self.collection_url(collection)?, id);
        let response = self
            .client
            .put(&url)
            .bearer_auth(key)
            .json(&doc)
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        Self::check_status(response.status(), &url)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        let (_, key) = self.credentials()?;
        let url = format!("{}/{}", self.collection_url(collection)?, id);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(key)
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        // A document deleted twice is still deleted.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check_status(response.status(), &url)
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<Value>, RemoteError> {
        let (_, key) = self.credentials()?;
        let url = self.collection_url(collection)?;
        let response = self
            .client
            .get(&url)
            .bearer_auth(key)
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        Self::check_status(response.status(), &url)?;

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

/// Fast reachability probe against the server's health endpoint.
///
/// Used as the network-required precondition before running a sync job.
pub async fn check_server(server_url: &str) -> bool {
    let url = format!("{}/health", server_url.trim_end_matches('/'));
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
    {
        Ok(c) => c,
        Err(_) => return false,
    };

    match client.get(&url).send().await {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}
