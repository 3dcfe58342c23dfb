use rustc_hash::FxHashMap;

use super::stream_info::StreamInfo;
use serde::{Deserialize, Serialize};

/// Information about a media item from a streaming platform.
///
/// Carries the clip metadata together with the resolved stream variants.
///
/// # Examples
///
/// ```rust
/// use kakaotv_parser::media::MediaInfo;
///
/// let media = MediaInfo::builder("https://tv.kakao.com/v/477029600", "Sample Clip", "Sample Channel")
///     .cover_url("https://example.com/cover.jpg")
///     .is_live(false)
///     .streams(vec![])
///     .build();
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MediaInfo {
    // Site of the media platform
    pub site_url: String,
    pub title: String,
    pub artist: String,
    pub cover_url: Option<String>,
    pub is_live: bool,
    pub streams: Vec<StreamInfo>,
    pub extras: Option<FxHashMap<String, String>>,
}

#[derive(Debug, Clone)]
pub struct MediaInfoBuilder {
    site_url: String,
    title: String,
    artist: String,
    cover_url: Option<String>,
    is_live: bool,
    streams: Vec<StreamInfo>,
    extras: Option<FxHashMap<String, String>>,
}

impl MediaInfo {
    pub fn builder(
        site_url: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
    ) -> MediaInfoBuilder {
        MediaInfoBuilder::new(site_url, title, artist)
    }
}

impl MediaInfoBuilder {
    pub fn new(
        site_url: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
    ) -> Self {
        Self {
            site_url: site_url.into(),
            title: title.into(),
            artist: artist.into(),
            cover_url: None,
            is_live: false,
            streams: Vec::new(),
            extras: None,
        }
    }

    pub fn cover_url(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = Some(cover_url.into());
        self
    }

    pub fn cover_url_opt(mut self, cover_url: Option<String>) -> Self {
        self.cover_url = cover_url;
        self
    }

    pub fn is_live(mut self, is_live: bool) -> Self {
        self.is_live = is_live;
        self
    }

    pub fn streams(mut self, streams: Vec<StreamInfo>) -> Self {
        self.streams = streams;
        self
    }

    pub fn extras(mut self, extras: FxHashMap<String, String>) -> Self {
        self.extras = Some(extras);
        self
    }

    pub fn build(self) -> MediaInfo {
        MediaInfo {
            site_url: self.site_url,
            title: self.title,
            artist: self.artist,
            cover_url: self.cover_url,
            is_live: self.is_live,
            streams: self.streams,
            extras: self.extras,
        }
    }
}
