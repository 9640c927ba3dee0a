use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use worktally::error::{redis_error, TallyResult};

/// Mock implementation of Redis for testing token storage
#[derive(Debug, Clone, Default)]
pub struct MockRedis {
    data: Arc<Mutex<HashMap<String, String>>>,
}

impl MockRedis {
    /// Create a new mock Redis instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a token to the mock Redis
    pub async fn save_token(&self, token: serde_json::Value) -> TallyResult<()> {
        let token_json = token.to_string();
        let mut data = self.data.lock().await;
        data.insert("worktally:google_token".to_string(), token_json);
        Ok(())
    }

    /// Get a token from the mock Redis
    pub async fn get_token(&self) -> TallyResult<Option<serde_json::Value>> {
        let data = self.data.lock().await;

        if let Some(token_json) = data.get("worktally:google_token") {
            let token: serde_json::Value = serde_json::from_str(token_json)
                .map_err(|e| redis_error(&format!("Failed to deserialize token: {e}")))?;
            Ok(Some(token))
        } else {
            Ok(None)
        }
    }
}

/// Basic test for the Redis mock
#[tokio::test]
async fn test_redis_mock() {
    // Create a new mock Redis
    let mock_redis = MockRedis::new();

    // No token stored yet
    let missing = mock_redis.get_token().await.unwrap();
    assert!(missing.is_none());

    // Store a token the way the OAuth flow would
    let token = serde_json::json!({
        "access_token": "test_token",
        "refresh_token": "test_refresh",
        "expires_in": 3600,
        "expires_at": 1741600800
    });

    // Save token
    mock_redis.save_token(token.clone()).await.unwrap();

    // Get token back
    let retrieved_token = mock_redis.get_token().await.unwrap();

    // Verify token
    assert!(retrieved_token.is_some());
    if let Some(token_value) = retrieved_token {
        assert_eq!(token_value["access_token"], "test_token");
        assert_eq!(token_value["expires_at"], 1741600800);
    }
}

/// Expiry decisions come from the stored epoch timestamp
#[tokio::test]
async fn test_token_expiry_check() {
    let mock_redis = MockRedis::new();

    let now = chrono::Utc::now().timestamp();
    let token = serde_json::json!({
        "access_token": "stale",
        "refresh_token": "test_refresh",
        "expires_at": now - 60
    });
    mock_redis.save_token(token).await.unwrap();

    let stored = mock_redis.get_token().await.unwrap().unwrap();
    let expires_at = stored
        .get("expires_at")
        .and_then(|v| v.as_i64())
        .unwrap_or(0);

    // A consumer seeing this token must refresh before calling the API
    assert!(expires_at < now);
}
