use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four video platforms clips are tracked on.
///
/// The wire form (events, cache keys, database rows) is the uppercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Platform {
    Youtube,
    Tiktok,
    Instagram,
    Twitter,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Youtube,
        Platform::Tiktok,
        Platform::Instagram,
        Platform::Twitter,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Youtube => "YOUTUBE",
            Platform::Tiktok => "TIKTOK",
            Platform::Instagram => "INSTAGRAM",
            Platform::Twitter => "TWITTER",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "YOUTUBE" => Ok(Platform::Youtube),
            "TIKTOK" => Ok(Platform::Tiktok),
            "INSTAGRAM" => Ok(Platform::Instagram),
            "TWITTER" => Ok(Platform::Twitter),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("tiktok".parse::<Platform>().unwrap(), Platform::Tiktok);
        assert_eq!("YouTube".parse::<Platform>().unwrap(), Platform::Youtube);
        assert_eq!("TWITTER".parse::<Platform>().unwrap(), Platform::Twitter);
    }

    #[test]
    fn unknown_platform_is_an_error() {
        let err = "VIMEO".parse::<Platform>().unwrap_err();
        assert_eq!(err.0, "VIMEO");
    }

    #[test]
    fn wire_form_round_trips_through_serde() {
        let json = serde_json::to_string(&Platform::Instagram).unwrap();
        assert_eq!(json, "\"INSTAGRAM\"");
        let back: Platform = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Platform::Instagram);
    }
}
