use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{info, management::TokenManager, spotify, spotify::Catalog, types::PkceToken, warning};

pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    info!("Opening Spotify login in your browser...");
    spotify::auth::auth(shared_state).await;

    let user = async {
        let mut tokens = TokenManager::load().await?;
        let client = spotify::SpotifyClient::new(tokens.get_valid_token().await?);
        client.current_user_id().await
    };
    match user.await {
        Ok(id) => info!("Logged in as {}", id),
        Err(e) => warning!("Logged in, but the user could not be resolved: {}", e),
    }
}
