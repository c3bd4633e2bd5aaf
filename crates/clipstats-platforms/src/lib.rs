//! Platform adapters for the four video platforms clips live on.
//!
//! Each adapter normalizes one upstream API to the common [`PlatformStats`]
//! counter tuple. Error policy is uniform across adapters: transport failures
//! and unexpected HTTP statuses are hard errors, while "the platform has no
//! document for this video" outcomes are soft — either all-zero counters
//! (TikTok, Instagram) or `Ok(None)` (Twitter URL that carries no tweet id).
//!
//! [`PlatformStats`]: clipstats_core::PlatformStats

pub mod adapter;
pub mod error;
pub mod instagram;
pub mod tiktok;
pub mod twitter;
pub mod youtube;

pub use adapter::{AdapterRegistry, PlatformAdapter};
pub use error::AdapterError;
pub use instagram::InstagramAdapter;
pub use tiktok::TikTokAdapter;
pub use twitter::TwitterAdapter;
pub use youtube::YouTubeAdapter;
