use std::path::PathBuf;

use chrono::Utc;

use crate::{
    config, debug,
    error::{AppError, Result},
    spotify,
    types::Token,
};

/// Seconds before expiry at which a token is refreshed proactively.
const REFRESH_MARGIN_SECS: u64 = 240;

pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    /// Loads the persisted token. A missing or unreadable token file means
    /// the user has not logged in yet.
    pub async fn load() -> Result<Self> {
        let path = Self::token_path();
        let content = async_fs::read_to_string(&path).await.map_err(|e| {
            debug!("Cannot read token at {}: {}", path.display(), e);
            AppError::AuthRequired
        })?;
        let token: Token = serde_json::from_str(&content).map_err(|_| AppError::AuthRequired)?;
        Ok(Self { token })
    }

    pub async fn persist(&self) -> std::result::Result<(), String> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(path, json).await.map_err(|e| e.to_string())
    }

    /// Returns an access token that is valid for at least a few minutes,
    /// refreshing and persisting it first when needed.
    pub async fn get_valid_token(&mut self) -> Result<String> {
        if self.is_expired() {
            debug!("Access token expired, refreshing");
            let new_token = spotify::auth::refresh_token(&self.token.refresh_token).await?;
            self.token = new_token;
            if let Err(e) = self.persist().await {
                debug!("Failed to persist refreshed token: {}", e);
            }
        }

        Ok(self.token.access_token.clone())
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + REFRESH_MARGIN_SECS >= self.token.obtained_at + self.token.expires_in
    }

    fn token_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}
