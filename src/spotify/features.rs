use std::time::Duration;

use reqwest::Client;

use crate::{
    config,
    error::Result,
    types::{AudioFeatures, AudioFeaturesResponse},
};

/// Fetches tempo, energy and valence for one track from the audio-features
/// service.
///
/// Spotify no longer serves audio features to new applications, so these come
/// from ReccoBeats, which accepts Spotify track ids. Returns `Ok(None)` when
/// the service knows nothing about the track.
pub async fn fetch_audio_features(spotify_id: &str) -> Result<Option<AudioFeatures>> {
    let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
    let api_url = format!("{uri}/audio-features", uri = &config::reccobeats_apiurl());

    let res = client
        .get(&api_url)
        .query(&[("ids", spotify_id)])
        .send()
        .await?
        .error_for_status()?
        .json::<AudioFeaturesResponse>()
        .await?;

    Ok(res.content.into_iter().next())
}
