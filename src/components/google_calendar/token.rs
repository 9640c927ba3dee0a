use crate::components::redis_service::RedisActorHandle;
use crate::config::Config;
use crate::error::{google_calendar_error, TallyResult};
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// OAuth endpoint used to exchange and refresh tokens
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Manages the OAuth token stored in Redis, refreshing it on expiry.
///
/// The token JSON carries `access_token`, `refresh_token` and `expires_at`
/// (epoch seconds); the refresh token is kept across refreshes.
#[derive(Clone)]
pub struct TokenManager {
    config: Arc<RwLock<Config>>,
    client: Client,
    redis_handle: RedisActorHandle,
}

impl TokenManager {
    pub fn new(config: Arc<RwLock<Config>>, redis_handle: RedisActorHandle) -> Self {
        Self {
            config,
            client: Client::new(),
            redis_handle,
        }
    }

    /// Get a valid OAuth token, refreshing the stored one when expired
    pub async fn get_token(&self) -> TallyResult<Value> {
        let token = self.redis_handle.get_token().await?.ok_or_else(|| {
            google_calendar_error("No token found. Run `connect_google` to authorize the account.")
        })?;

        // Check if the token is still valid
        if let Some(expiry) = token.get("expires_at").and_then(|v| v.as_i64()) {
            let now = Utc::now().timestamp();
            if expiry > now {
                return Ok(token);
            }
            debug!("Stored token expired, refreshing");
            return self.refresh_token(&token).await;
        }

        Err(google_calendar_error(
            "Stored token has no expiry. Run `connect_google` to authorize again.",
        ))
    }

    /// Refresh an expired token and persist the replacement
    async fn refresh_token(&self, token: &Value) -> TallyResult<Value> {
        let refresh_token = token
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| google_calendar_error("No refresh token in token data"))?;

        let (client_id, client_secret) = {
            let config_read = self.config.read().await;
            (
                config_read.google_client_id.clone(),
                config_read.google_client_secret.clone(),
            )
        };

        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token.to_string()),
            ("grant_type", "refresh_token".to_string()),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let new_token: Value = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse token response: {}", e)))?;

        let access_token = new_token
            .get("access_token")
            .cloned()
            .ok_or_else(|| google_calendar_error("Token response missing 'access_token' field"))?;

        // Combine the new access token with the existing refresh token
        let mut token_data = serde_json::Map::new();
        token_data.insert("access_token".to_string(), access_token);
        token_data.insert("refresh_token".to_string(), json!(refresh_token));

        // Calculate expiry
        let expires_in = new_token
            .get("expires_in")
            .and_then(|v| v.as_i64())
            .unwrap_or(3600);
        let expires_at = Utc::now().timestamp() + expires_in;
        token_data.insert("expires_at".to_string(), json!(expires_at));

        let token_json = Value::Object(token_data);
        self.redis_handle.save_token(token_json.clone()).await?;

        Ok(token_json)
    }

    /// Store a token, overwriting any previous one
    pub async fn set_token(&self, token_json: Value) -> TallyResult<()> {
        self.redis_handle.save_token(token_json).await
    }
}
