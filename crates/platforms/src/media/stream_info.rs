use crate::media::MediaFormat;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StreamInfo {
    // Url of the stream
    pub url: String,
    pub format: MediaFormat,
    // Quality of the stream, e.g., "1080p", "720p", etc.
    pub quality: String,
    pub extras: Option<FxHashMap<String, String>>,
}

impl fmt::Display for StreamInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(profile) = self.extras.as_ref().and_then(|e| e.get("profile")) {
            write!(f, "{} - {} (profile {})", self.format, self.quality, profile)
        } else {
            write!(f, "{} - {}", self.format, self.quality)
        }
    }
}
