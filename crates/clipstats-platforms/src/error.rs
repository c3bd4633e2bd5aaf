use clipstats_core::Platform;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{platform} API key is not configured")]
    MissingApiKey { platform: Platform },

    #[error("{platform} has no video with id {video_id}")]
    VideoNotFound { platform: Platform, video_id: String },
}
