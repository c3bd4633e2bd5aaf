use thiserror::Error;

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("peer returned 404 for {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
