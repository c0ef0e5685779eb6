use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Extension, Router,
    routing::{delete, get, post},
};
use tokio::sync::Mutex;

use crate::{
    Res, api, config, debug,
    error::{AppError, Result},
    info,
    management::{CacheEntry, CacheKey, CachingCoordinator, LikedSongsCache, TokenManager},
    spotify::{Catalog, SpotifyClient},
    store::Store,
    types::PkceToken,
};

/// Shared state of the JSON API.
///
/// One server process serves one logged-in user; the cache key and owner id
/// are resolved from that user at startup.
#[derive(Clone)]
pub struct AppState {
    pub cache_key: CacheKey,
    pub owner_id: String,
    pub tokens: Arc<Mutex<TokenManager>>,
    pub cache: Arc<LikedSongsCache>,
    pub coordinator: Arc<CachingCoordinator>,
    pub store: Arc<Store>,
}

impl AppState {
    /// Loads the persisted token, resolves the current user and opens the
    /// store at the configured path.
    pub async fn initialize() -> Result<Self> {
        let mut tokens = TokenManager::load().await?;
        let client = SpotifyClient::new(tokens.get_valid_token().await?);
        let owner_id = client.current_user_id().await?;
        let store = Store::open(config::database_path())?;

        debug!("Serving liked songs of {}", owner_id);
        Ok(Self {
            cache_key: CacheKey::for_user(&owner_id),
            owner_id,
            tokens: Arc::new(Mutex::new(tokens)),
            cache: Arc::new(LikedSongsCache::new()),
            coordinator: Arc::new(CachingCoordinator::new()),
            store: Arc::new(store),
        })
    }

    /// A catalog client with a currently valid access token.
    pub async fn client(&self) -> Result<SpotifyClient> {
        let token = self.tokens.lock().await.get_valid_token().await?;
        Ok(SpotifyClient::new(token))
    }

    /// The current liked-songs snapshot. Never builds one.
    pub fn snapshot(&self) -> Result<Arc<CacheEntry>> {
        self.cache
            .get(&self.cache_key)
            .ok_or(AppError::NoCacheAvailable)
    }
}

fn listen_addr() -> Res<SocketAddr> {
    let addr = config::server_addr()?;
    Ok(SocketAddr::from_str(&addr)?)
}

/// Serves the OAuth callback while the login flow waits for a token.
pub async fn start_api_server(state: Arc<Mutex<Option<PkceToken>>>) -> Res<()> {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)));

    let listener = tokio::net::TcpListener::bind(listen_addr()?).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/cache", post(api::load_cache))
        .route("/cache/progress", get(api::cache_progress))
        .route("/songs/search", get(api::search_songs))
        .route("/songs/filter", get(api::filter_songs))
        .route("/songs/at", get(api::song_at))
        .route("/songs/next", get(api::next_song))
        .route("/songs/previous", get(api::previous_song))
        .route(
            "/songs/{id}/attributes",
            get(api::get_attributes).post(api::set_attributes),
        )
        .route("/songs/{id}/tags", get(api::song_tags).post(api::add_tag))
        .route("/songs/{id}/tags/{tag_id}", delete(api::remove_tag))
        .route("/songs/{id}/audio-features", get(api::audio_features))
        .route("/tags", get(api::list_tags))
        .route("/tags/{id}", delete(api::delete_tag))
        .route("/playlists", get(api::list_playlists))
        .route("/playlists/count", get(api::owned_playlist_count))
        .route(
            "/playlists/smart",
            get(api::list_smart_playlists).post(api::create_smart_playlist),
        )
        .route("/playlists/refresh-all", post(api::refresh_all_playlists))
        .route("/playlists/{id}/refresh", post(api::refresh_playlist))
        .route("/liked/import", post(api::import_liked))
        .with_state(state)
}

/// Serves the JSON API until the process is stopped.
pub async fn start_app_server(state: AppState) -> Res<()> {
    let addr = listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app_router(state)).await?;
    Ok(())
}
