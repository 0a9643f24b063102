use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::Config;
use crate::{Error, Resource, Result, TranscriptLocation, TranscriptPayload, VideoMetadata};

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

const VIDEO_PREFIX: &str = "RegularUserVideo:";
const TRANSCRIPT_PREFIX: &str = "VideoTranscriptDetails:";

static APOLLO_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"window\.__APOLLO_STATE__\s*=\s*(\{[\s\S]*?\});").expect("apollo state pattern")
});

/// Apollo cache entries keyed by `Typename:id`, in document order
pub type ApolloState = Map<String, Value>;

/// Fetch the share page HTML
pub async fn fetch_page(client: &reqwest::Client, config: &Config, url: &str) -> Result<String> {
    debug!("Fetching share page: {url}");

    let resp = client
        .get(url)
        .header("User-Agent", config.user_agent())
        .header("Accept", HTML_ACCEPT)
        .send()
        .await?;

    let body = read_body(resp, Resource::Page, config.max_response_bytes()).await?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Fetch and decode the transcript JSON from its CDN URL
pub async fn fetch_transcript(client: &reqwest::Client, config: &Config, url: &str) -> Result<TranscriptPayload> {
    debug!("Fetching transcript: {url}");

    let resp = client
        .get(url)
        .header("User-Agent", config.user_agent())
        .send()
        .await?;

    let body = read_body(resp, Resource::Transcript, config.max_response_bytes()).await?;
    let payload: TranscriptPayload = serde_json::from_slice(&body).map_err(|source| Error::Parse {
        resource: Resource::Transcript,
        source,
    })?;

    debug!(
        "Transcript payload: lang={:?} phrases={} words={}",
        payload.source_lang,
        payload.phrases.as_ref().map_or(0, Vec::len),
        payload.timecoded_text.as_ref().map_or(0, Vec::len),
    );
    Ok(payload)
}

async fn read_body(mut resp: reqwest::Response, resource: Resource, limit: u64) -> Result<Vec<u8>> {
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Status {
            resource,
            status: status.as_u16(),
        });
    }

    if resp.content_length().is_some_and(|len| len > limit) {
        return Err(Error::TooLarge { resource, limit });
    }

    let mut body = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        if (body.len() + chunk.len()) as u64 > limit {
            return Err(Error::TooLarge { resource, limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Pull the `window.__APOLLO_STATE__` object out of the page markup
pub fn extract_state(html: &str) -> Result<ApolloState> {
    let caps = APOLLO_STATE.captures(html).ok_or(Error::StateNotFound)?;
    let state: ApolloState = serde_json::from_str(&caps[1]).map_err(|source| Error::Parse {
        resource: Resource::Page,
        source,
    })?;
    debug!("Apollo state: {} entries", state.len());
    Ok(state)
}

/// First `RegularUserVideo:` entry whose key mentions the video ID
pub fn find_video(state: &ApolloState, video_id: &str) -> Option<VideoMetadata> {
    let (key, value) = state
        .iter()
        .find(|(k, _)| k.starts_with(VIDEO_PREFIX) && k.contains(video_id))?;
    debug!("Video record: {key}");
    decode_entry(key, value)
}

/// First `VideoTranscriptDetails:` entry. Not correlated with the video ID.
pub fn find_transcript_location(state: &ApolloState) -> Option<TranscriptLocation> {
    let mut keys = state.keys().filter(|k| k.starts_with(TRANSCRIPT_PREFIX));
    let key = keys.next()?;

    let others = keys.count();
    if others > 0 {
        warn!("Found {} transcript records, using {key}", others + 1);
    } else {
        debug!("Transcript record: {key}");
    }

    decode_entry(key, &state[key.as_str()])
}

fn decode_entry<T: DeserializeOwned>(key: &str, value: &Value) -> Option<T> {
    match T::deserialize(value) {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!("Ignoring malformed record {key}: {e}");
            None
        }
    }
}
