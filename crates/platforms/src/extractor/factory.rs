use std::sync::LazyLock;

use super::error::ExtractorError;
use super::platform_extractor::PlatformExtractor;
use crate::extractor::platforms::{self, kakaotv::KakaoTv};
use regex::Regex;
use reqwest::Client;

// A type alias for a thread-safe constructor function.
type ExtractorConstructor =
    fn(String, Client, Option<serde_json::Value>) -> Box<dyn PlatformExtractor>;

struct PlatformEntry {
    regex: &'static LazyLock<Regex>,
    constructor: ExtractorConstructor,
}

// Static platform registry.
static PLATFORMS: &[PlatformEntry] = &[PlatformEntry {
    regex: &platforms::kakaotv::URL_REGEX,
    constructor: |url, client, extras| {
        Box::new(KakaoTv::new(url, client, extras)) as Box<dyn PlatformExtractor>
    },
}];

/// A factory for creating platform-specific extractors.
pub struct ExtractorFactory {
    client: Client,
}

impl ExtractorFactory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn create_extractor(
        &self,
        url: &str,
        extras: Option<serde_json::Value>,
    ) -> Result<Box<dyn PlatformExtractor>, ExtractorError> {
        for platform in PLATFORMS {
            if platform.regex.is_match(url) {
                return Ok((platform.constructor)(
                    url.to_string(),
                    self.client.clone(),
                    extras,
                ));
            }
        }

        Err(ExtractorError::UnsupportedExtractor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_clip_urls() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let factory = ExtractorFactory::new(Client::new());
        let extractor = factory
            .create_extractor("https://tv.kakao.com/v/477029600", None)
            .unwrap();
        assert_eq!(extractor.get_extractor().platform_name, "KakaoTV");
    }

    #[test]
    fn rejects_foreign_urls() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let factory = ExtractorFactory::new(Client::new());
        let result = factory.create_extractor("https://www.twitch.tv/somechannel", None);
        assert!(matches!(result, Err(ExtractorError::UnsupportedExtractor)));
    }
}
