use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Remote document a request was made for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Page,
    Transcript,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Page => write!(f, "Loom page"),
            Resource::Transcript => write!(f, "transcript"),
        }
    }
}

/// Fatal pipeline failures. A missing transcript is not one of these.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid Loom URL. Expected format: https://www.loom.com/share/<video-id>")]
    InvalidUrl(String),

    #[error("Failed to fetch {resource} ({status})")]
    Status { resource: Resource, status: u16 },

    #[error("{resource} response exceeded {limit} bytes")]
    TooLarge { resource: Resource, limit: u64 },

    #[error("Could not find Apollo state in page")]
    StateNotFound,

    #[error("Failed to parse {}", parse_subject(.resource))]
    Parse {
        resource: Resource,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

fn parse_subject(resource: &Resource) -> &'static str {
    match resource {
        Resource::Page => "video data",
        Resource::Transcript => "transcript data",
    }
}
