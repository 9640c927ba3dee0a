use crate::config::Config;
use crate::error::{redis_error, TallyResult};
use redis::{aio::MultiplexedConnection, AsyncCommands, Client as RedisClient};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::info;

// Redis key constants
pub mod keys {
    pub const GOOGLE_TOKEN: &str = "worktally:google_token";
}

/// The Redis actor that processes messages
pub struct RedisActor {
    config: Arc<RwLock<Config>>,
    command_rx: mpsc::Receiver<RedisCommand>,
}

/// Commands that can be sent to the Redis actor
pub enum RedisCommand {
    GetToken(mpsc::Sender<TallyResult<Option<Value>>>),
    SaveToken(Value, mpsc::Sender<TallyResult<()>>),
    Shutdown,
}

/// Handle for communicating with the Redis actor
#[derive(Clone)]
pub struct RedisActorHandle {
    command_tx: mpsc::Sender<RedisCommand>,
}

impl RedisActorHandle {
    /// Create a new empty handle for initialization purposes
    pub fn empty() -> Self {
        let (command_tx, _) = mpsc::channel(32);
        Self { command_tx }
    }

    /// Get the OAuth token from Redis, `None` when no token is stored
    pub async fn get_token(&self) -> TallyResult<Option<Value>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(RedisCommand::GetToken(response_tx))
            .await
            .map_err(|e| redis_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| redis_error("Response channel closed"))?
    }

    /// Save the OAuth token to Redis
    pub async fn save_token(&self, token: Value) -> TallyResult<()> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(RedisCommand::SaveToken(token, response_tx))
            .await
            .map_err(|e| redis_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| redis_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> TallyResult<()> {
        let _ = self.command_tx.send(RedisCommand::Shutdown).await;
        Ok(())
    }
}

impl RedisActor {
    /// Create a new actor and return its handle
    pub fn new(config: Arc<RwLock<Config>>) -> (Self, RedisActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self { config, command_rx };
        let handle = RedisActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Redis actor started");

        // Process commands
        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                RedisCommand::GetToken(response_tx) => {
                    let result = self.get_token_from_redis().await;
                    let _ = response_tx.send(result).await;
                }
                RedisCommand::SaveToken(token, response_tx) => {
                    let result = self.save_token_to_redis(token).await;
                    let _ = response_tx.send(result).await;
                }
                RedisCommand::Shutdown => {
                    info!("Redis actor shutting down");
                    break;
                }
            }
        }

        info!("Redis actor shut down");
    }

    /// Get a redis connection
    async fn get_redis_connection(&self) -> TallyResult<MultiplexedConnection> {
        // Get Redis URL from config
        let redis_url = {
            let config_guard = self.config.read().await;
            config_guard.redis_url.clone()
        };

        let client = RedisClient::open(redis_url)
            .map_err(|e| redis_error(&format!("Failed to create Redis client: {}", e)))?;

        client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| redis_error(&format!("Failed to connect to Redis: {}", e)))
    }

    /// Get the stored token from Redis
    async fn get_token_from_redis(&self) -> TallyResult<Option<Value>> {
        let mut redis_conn = self.get_redis_connection().await?;

        // Check if a token exists in Redis
        let exists: bool = redis_conn
            .exists(keys::GOOGLE_TOKEN)
            .await
            .map_err(|e| redis_error(&format!("Redis error: {}", e)))?;

        if !exists {
            return Ok(None);
        }

        let token_json: String = redis_conn
            .get(keys::GOOGLE_TOKEN)
            .await
            .map_err(|e| redis_error(&format!("Failed to read token from Redis: {}", e)))?;

        let token: Value = serde_json::from_str(&token_json)
            .map_err(|e| redis_error(&format!("Failed to deserialize token: {}", e)))?;

        Ok(Some(token))
    }

    /// Save the token to Redis
    async fn save_token_to_redis(&self, token: Value) -> TallyResult<()> {
        let mut redis_conn = self.get_redis_connection().await?;

        let _: () = redis_conn
            .set(keys::GOOGLE_TOKEN, token.to_string())
            .await
            .map_err(|e| redis_error(&format!("Failed to save token to Redis: {}", e)))?;

        Ok(())
    }
}
