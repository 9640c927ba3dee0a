use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use worktally::components::google_calendar::token::{TokenManager, TOKEN_URL};
use worktally::components::redis_service::RedisActor;
use worktally::config::Config;
use worktally::error::{other_error, TallyResult};

const REDIRECT_URI: &str = "http://localhost:8080";

#[tokio::main]
async fn main() -> TallyResult<()> {
    // Load configuration
    let config = Config::load()?;
    let config = Arc::new(RwLock::new(config));

    // Create Redis actor
    let (mut redis_actor, redis_handle) = RedisActor::new(config.clone());

    // Spawn Redis actor task
    let _redis_task = tokio::spawn(async move {
        redis_actor.run().await;
    });

    // Create token manager with Redis handle
    let token_manager = TokenManager::new(config.clone(), redis_handle);

    // Get client ID and secret
    let client_id = config.read().await.google_client_id.clone();
    let client_secret = config.read().await.google_client_secret.clone();

    // Generate random state for security
    let state = uuid::Uuid::new_v4().to_string();

    // Construct authorization URL
    let auth_url = format!(
        "https://accounts.google.com/o/oauth2/v2/auth?\
        client_id={}&\
        redirect_uri={}&\
        response_type=code&\
        access_type=offline&\
        prompt=consent&\
        scope=https://www.googleapis.com/auth/calendar.readonly&\
        state={}",
        client_id, REDIRECT_URI, state
    );

    // Open browser for authorization
    println!("Opening browser for Google Calendar authorization...");
    if webbrowser::open(&auth_url).is_err() {
        println!("Could not open a browser. Visit this URL instead:\n{}", auth_url);
    }

    // Start local server to receive the callback
    let server = tiny_http::Server::http("127.0.0.1:8080")
        .map_err(|e| other_error(&format!("Failed to start callback server: {}", e)))?;
    println!("Waiting for authorization callback...");

    // Handle the callback
    let request = server.recv()?;
    let callback_url = request.url().to_string();

    // The callback must echo the state this run generated
    let returned_state = query_param(&callback_url, "state");
    if returned_state.as_deref() != Some(state.as_str()) {
        respond(request, "Authorization failed: state mismatch.")?;
        return Err(other_error("State parameter mismatch in callback"));
    }

    let code = match query_param(&callback_url, "code") {
        Some(code) => code,
        None => {
            respond(request, "Authorization failed: no code in callback.")?;
            return Err(other_error("No authorization code found in callback"));
        }
    };

    // Exchange code for tokens
    let client = reqwest::Client::new();
    let response = client
        .post(TOKEN_URL)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("redirect_uri", REDIRECT_URI.to_string()),
            ("grant_type", "authorization_code".to_string()),
        ])
        .send()
        .await
        .map_err(|e| other_error(&format!("Failed to exchange authorization code: {}", e)))?;

    if !response.status().is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        respond(request, "Authorization failed, see the terminal for details.")?;
        return Err(other_error(&format!("Failed to get token: {}", error_text)));
    }

    let mut token_data: Value = response
        .json()
        .await
        .map_err(|e| other_error(&format!("Failed to parse token response: {}", e)))?;

    // Add expiry timestamp
    let expires_in = token_data
        .get("expires_in")
        .and_then(|v| v.as_i64())
        .unwrap_or(3600);
    let expires_at = chrono::Utc::now().timestamp() + expires_in;

    match token_data.as_object_mut() {
        Some(obj) => {
            obj.insert("expires_at".to_string(), json!(expires_at));
        }
        None => {
            respond(request, "Authorization failed, see the terminal for details.")?;
            return Err(other_error("Token data is not an object"));
        }
    }

    // Save token using TokenManager
    token_manager.set_token(token_data).await?;

    // Send success response to browser
    respond(request, "Authorization successful! You can close this window.")?;

    println!("Token saved. `worktally report` can now reach your calendars.");

    Ok(())
}

/// Pull one percent-decoded query parameter out of the callback path
fn query_param(raw: &str, name: &str) -> Option<String> {
    let full = format!("http://localhost{}", raw);
    let parsed = url::Url::parse(&full).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn respond(request: tiny_http::Request, message: &str) -> TallyResult<()> {
    let response = tiny_http::Response::from_string(message);
    request.respond(response)?;
    Ok(())
}
