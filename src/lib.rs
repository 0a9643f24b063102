pub mod config;
pub mod error;
pub mod loom;
pub mod output;

use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::Deserialize;

pub use error::{Error, Resource, Result};

use config::Config;

static SHARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"loom\.com/share/([a-zA-Z0-9]+)").expect("share URL pattern"));

/// `RegularUserVideo:*` record from the page's Apollo state
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub chapters: Option<String>,
    pub video_properties: Option<VideoProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoProperties {
    pub duration: Option<f64>,
    #[serde(rename = "durationMs")]
    pub duration_ms: Option<f64>,
}

impl VideoMetadata {
    /// Duration in seconds, preferring `duration` over `durationMs`. Zero counts as unknown.
    pub fn duration_secs(&self) -> Option<f64> {
        let props = self.video_properties.as_ref()?;
        props
            .duration
            .filter(|d| *d > 0.0)
            .or_else(|| props.duration_ms.filter(|ms| *ms > 0.0).map(|ms| ms / 1000.0))
    }
}

/// `VideoTranscriptDetails:*` record from the page's Apollo state
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptLocation {
    pub source_url: Option<String>,
    pub captions_source_url: Option<String>,
    pub language: Option<String>,
}

/// A single timestamped phrase
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Phrase {
    pub ts: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub value: String,
}

/// A single word with its start and end offsets
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Word {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    pub start_ts: f64,
    /// Missing end offsets are treated as `start_ts`
    #[serde(default)]
    pub end_ts: Option<f64>,
}

impl Word {
    pub fn end(&self) -> f64 {
        self.end_ts.unwrap_or(self.start_ts)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Transcript JSON as served from the CDN
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptPayload {
    pub source_lang: Option<String>,
    pub phrases: Option<Vec<Phrase>>,
    pub timecoded_text: Option<Vec<Word>>,
}

/// Paragraph of transcript text anchored at its first timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub start: f64,
    pub text: String,
}

/// What ends up below the metadata header
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptBody {
    /// No transcript record or no source URL on the page
    Unavailable,
    /// Transcript fetched, but neither phrases nor words present
    Empty,
    Paragraphs(Vec<Paragraph>),
}

/// Everything needed to render the markdown for one video
#[derive(Debug, Clone)]
pub struct Document {
    pub video_id: String,
    pub video: Option<VideoMetadata>,
    pub language: Option<String>,
    pub body: TranscriptBody,
}

impl Document {
    pub fn title(&self) -> &str {
        self.video
            .as_ref()
            .and_then(|v| v.name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or("Untitled")
    }
}

/// Extract the video ID from a Loom share URL
pub fn extract_video_id(input: &str) -> Option<String> {
    SHARE_URL.captures(input.trim()).map(|caps| caps[1].to_string())
}

/// Run the whole pipeline for one share URL: page, Apollo state, transcript.
pub async fn fetch_document(client: &reqwest::Client, config: &Config, url: &str) -> Result<Document> {
    let url = url.trim();
    let video_id = extract_video_id(url).ok_or_else(|| Error::InvalidUrl(url.to_string()))?;
    debug!("Video ID: {video_id}");

    let html = loom::fetch_page(client, config, url).await?;
    let state = loom::extract_state(&html)?;

    let video = loom::find_video(&state, &video_id);
    let location = loom::find_transcript_location(&state);

    let Some(source_url) = location.as_ref().and_then(|l| l.source_url.clone()) else {
        debug!("No transcript source URL for {video_id}");
        return Ok(Document {
            video_id,
            video,
            language: location.and_then(|l| l.language),
            body: TranscriptBody::Unavailable,
        });
    };

    let payload = loom::fetch_transcript(client, config, &source_url).await?;
    let language = payload
        .source_lang
        .clone()
        .or_else(|| location.and_then(|l| l.language));

    Ok(Document {
        video_id,
        video,
        language,
        body: output::transcript_body(&payload),
    })
}
