use std::fmt::Write;

use crate::{Document, Paragraph, Phrase, TranscriptBody, TranscriptPayload, Word};

/// Silence (seconds) between words that starts a new paragraph
pub const PARAGRAPH_GAP_SECONDS: f64 = 3.0;

/// Format seconds as `M:SS`, flooring both parts
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Pick the transcript shape: phrases win over words, otherwise empty.
pub fn transcript_body(payload: &TranscriptPayload) -> TranscriptBody {
    let paragraphs = if let Some(phrases) = payload.phrases.as_deref().filter(|p| !p.is_empty()) {
        phrase_paragraphs(phrases)
    } else if let Some(words) = payload.timecoded_text.as_deref().filter(|w| !w.is_empty()) {
        group_words(words, PARAGRAPH_GAP_SECONDS)
    } else {
        Vec::new()
    };

    if paragraphs.is_empty() {
        TranscriptBody::Empty
    } else {
        TranscriptBody::Paragraphs(paragraphs)
    }
}

fn phrase_paragraphs(phrases: &[Phrase]) -> Vec<Paragraph> {
    phrases
        .iter()
        .filter(|p| !p.value.trim().is_empty())
        .map(|p| Paragraph {
            start: p.ts,
            text: p.value.clone(),
        })
        .collect()
}

/// Merge consecutive words into paragraphs, splitting when the silence
/// since the previous word's end exceeds `gap`. Blank words are skipped.
pub fn group_words(words: &[Word], gap: f64) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut start = 0.0;
    let mut last_end = 0.0;

    for word in words.iter().filter(|w| !w.text.trim().is_empty()) {
        if !current.is_empty() && word.start_ts - last_end > gap {
            paragraphs.push(Paragraph {
                start,
                text: current.join(" "),
            });
            current.clear();
        }

        if current.is_empty() {
            start = word.start_ts;
        }

        current.push(&word.text);
        last_end = word.end();
    }

    if !current.is_empty() {
        paragraphs.push(Paragraph {
            start,
            text: current.join(" "),
        });
    }

    paragraphs
}

/// Render the full markdown document
pub fn render_markdown(doc: &Document) -> String {
    let mut out = String::new();
    // writeln! into a String cannot fail
    let _ = write_markdown(&mut out, doc);
    out
}

fn write_markdown(out: &mut String, doc: &Document) -> std::fmt::Result {
    let video = doc.video.as_ref();

    writeln!(out, "# Loom Video Transcript\n")?;
    writeln!(out, "**Title:** {}", doc.title())?;

    if let Some(description) = video.and_then(|v| v.description.as_deref()).filter(|d| !d.is_empty()) {
        writeln!(out, "\n**Description:** {description}")?;
    }
    if let Some(duration) = video.and_then(|v| v.duration_secs()) {
        writeln!(out, "\n**Duration:** {}", format_timestamp(duration))?;
    }
    writeln!(out, "\n**Video ID:** {}", doc.video_id)?;

    if let Some(chapters) = video.and_then(|v| v.chapters.as_deref()).filter(|c| !c.is_empty()) {
        writeln!(out, "\n**Chapters:**")?;
        writeln!(out, "{chapters}")?;
    }

    writeln!(out, "\n---\n")?;

    match &doc.body {
        TranscriptBody::Unavailable => {
            writeln!(out, "*No transcript available for this video.*")?;
            writeln!(out, "\nThis could mean:")?;
            writeln!(out, "- The video is still being processed")?;
            writeln!(out, "- Transcription was disabled for this video")?;
            writeln!(out, "- The video has no spoken audio")?;
        }
        TranscriptBody::Empty => {
            writeln!(out, "*Transcript is empty.*")?;
        }
        TranscriptBody::Paragraphs(paragraphs) => {
            writeln!(out, "## Transcript\n")?;
            for p in paragraphs {
                writeln!(out, "**[{}]** {}\n", format_timestamp(p.start), p.text)?;
            }
            writeln!(out, "\n---\n*Transcript extracted from Loom*")?;
        }
    }

    Ok(())
}
