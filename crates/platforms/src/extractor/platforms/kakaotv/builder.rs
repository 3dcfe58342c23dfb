use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::extractor::error::ExtractorError;
use crate::extractor::platform_extractor::{Extractor, PlatformExtractor};
use crate::extractor::platforms::kakaotv::models::{KatzResponse, OembedResponse, VideoLocation};
use crate::extractor::utils::{capture_group_1, capture_group_1_or_invalid_url};
use crate::media::media_info::MediaInfo;
use crate::media::{MediaFormat, StreamInfo};
use async_trait::async_trait;
use futures::future::try_join_all;
use regex::Regex;
use reqwest::Client;
use rustc_hash::FxHashMap;
use tracing::debug;
use uuid::Uuid;

pub static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://(?:www\.)?tv\.kakao\.com/v/(\d+)").unwrap());

static IFRAME_SRC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<iframe[^>]+src=["']([^"']+)["']"#).unwrap());

// Browser-like UA carrying the negotiated app version.
static PLAYER_UA: LazyLock<String> = LazyLock::new(|| {
    format!(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
        KakaoTv::APP_VERSION
    )
});

pub struct KakaoTv {
    extractor: Extractor,
    tv_base: String,
    play_base: String,
    // qualities resolved by `PlatformExtractor::extract`
    qualities: Vec<u32>,
}

impl KakaoTv {
    const TV_BASE: &'static str = "https://tv.kakao.com";
    const PLAY_BASE: &'static str = "https://play-tv.kakao.com";
    const APP_VERSION: &'static str = "88.0.4324.190";
    const PLAYER: &'static str = "monet_html5";
    const SERVICE: &'static str = "und_player";
    // Negotiation always declares the top profile; the per-quality profile is
    // only sent on the videoLocation request.
    const NEGOTIATION_PROFILE: &'static str = "HIGH4";
    const READY_FIELDS: &'static str = "seekUrl,abrVideoLocationList";
    const DEFAULT_PROFILE: &'static str = "MAIN";

    // Pixel-height ladder mapped positionally onto the KATZ profile names.
    const QUALITY_LADDER: [(u32, &'static str); 5] = [
        (240, "LOW"),
        (360, "BASE"),
        (480, "MAIN"),
        (720, "HIGH"),
        (1080, "HIGH4"),
    ];
    const DEFAULT_QUALITIES: [u32; 5] = [240, 360, 480, 720, 1080];

    pub fn new(platform_url: String, client: Client, extras: Option<serde_json::Value>) -> Self {
        let mut extractor = Extractor::new("KakaoTV", platform_url, client);
        extractor.add_header_typed(reqwest::header::ACCEPT, "*/*");
        extractor.add_header_typed(reqwest::header::USER_AGENT, PLAYER_UA.as_str());
        extractor.add_param("player", Self::PLAYER);
        extractor.add_param("service", Self::SERVICE);
        extractor.add_param("section", Self::SERVICE);
        extractor.add_param("dteType", "PC");

        let qualities = Self::qualities_from_extras(extras.as_ref());
        Self {
            extractor,
            tv_base: Self::TV_BASE.to_string(),
            play_base: Self::PLAY_BASE.to_string(),
            qualities,
        }
    }

    /// Constructs an extractor for a clip id, e.g. `477029600`.
    pub fn for_clip(clip_id: impl AsRef<str>, client: Client) -> Self {
        Self::new(
            format!("{}/v/{}", Self::TV_BASE, clip_id.as_ref()),
            client,
            None,
        )
    }

    /// Override the platform hosts, e.g. to route through a proxy or a local
    /// test server.
    pub fn set_hosts(&mut self, tv_base: impl Into<String>, play_base: impl Into<String>) {
        self.tv_base = tv_base.into();
        self.play_base = play_base.into();
    }

    pub fn clip_id(&self) -> Result<&str, ExtractorError> {
        capture_group_1_or_invalid_url(&URL_REGEX, &self.extractor.url)
    }

    /// Maps a pixel height onto the KATZ profile name.
    ///
    /// Off-ladder values degrade to the default profile instead of failing;
    /// callers that want strict behavior must validate the quality upfront.
    pub fn profile_for(quality: u32) -> &'static str {
        match Self::QUALITY_LADDER.iter().find(|(q, _)| *q == quality) {
            Some((_, profile)) => profile,
            None => {
                debug!(quality, "quality not in ladder, using default profile");
                Self::DEFAULT_PROFILE
            }
        }
    }

    // fresh 16-byte hex player session id, one per ticket negotiation
    fn player_session_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    fn epoch_millis() -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis()
            .to_string()
    }

    fn qualities_from_extras(extras: Option<&serde_json::Value>) -> Vec<u32> {
        let Some(requested) = extras.and_then(|e| e.get("qualities")) else {
            return Self::DEFAULT_QUALITIES.to_vec();
        };

        let parsed: Vec<u32> = if let Some(list) = requested.as_array() {
            list.iter()
                .filter_map(|v| v.as_u64())
                .map(|v| v as u32)
                .collect()
        } else if let Some(csv) = requested.as_str() {
            csv.split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect()
        } else {
            Vec::new()
        };

        if parsed.is_empty() {
            Self::DEFAULT_QUALITIES.to_vec()
        } else {
            parsed
        }
    }

    fn parse_video_location(
        body: &str,
        endpoint: &'static str,
    ) -> Result<VideoLocation, ExtractorError> {
        let response: KatzResponse = serde_json::from_str(body)?;
        response.video_location.ok_or_else(|| {
            ExtractorError::ValidationError(format!("missing videoLocation in {endpoint} response"))
        })
    }

    /// Fetches the oEmbed record for the clip's public page.
    ///
    /// The oEmbed call is made with the bare client: the production endpoint
    /// serves it without any of the player headers the KATZ API expects.
    pub async fn fetch_oembed(&self) -> Result<OembedResponse, ExtractorError> {
        let clip_url = format!("{}/v/{}", self.tv_base, self.clip_id()?);
        let response = self
            .extractor
            .client
            .get(format!("{}/oembed", self.tv_base))
            .query(&[("url", clip_url.as_str())])
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Resolves the embed player URL used as the `Referer` for KATZ calls.
    ///
    /// Resolved fresh for every call that needs a referer; the value is a
    /// plain string by the time any request is built.
    pub async fn resolve_embed_url(&self) -> Result<String, ExtractorError> {
        let oembed = self.fetch_oembed().await?;
        let embed_url = capture_group_1(&IFRAME_SRC_REGEX, &oembed.html).ok_or_else(|| {
            ExtractorError::ValidationError("no embeddable iframe in oEmbed fragment".to_string())
        })?;
        debug!(embed_url, "resolved embed url");
        Ok(embed_url.to_string())
    }

    /// Negotiates a playback ticket for the clip.
    ///
    /// Every call generates a fresh player session id; tickets are
    /// short-lived and consumed by exactly one videoLocation request.
    pub async fn fetch_ticket(&self) -> Result<String, ExtractorError> {
        let referer = self.resolve_embed_url().await?;
        let session_id = Self::player_session_id();
        let cache_buster = Self::epoch_millis();
        let url = format!(
            "{}/katz/v3/ft/cliplink/{}/readyNplay",
            self.play_base,
            self.clip_id()?
        );
        debug!(%session_id, "negotiating playback ticket");
        let response = self
            .extractor
            .get(&url)
            .query(&[
                ("uuid", session_id.as_str()),
                ("profile", Self::NEGOTIATION_PROFILE),
                ("fields", Self::READY_FIELDS),
                ("appVersion", Self::APP_VERSION),
                ("startPosition", "0"),
                ("continuousPlay", "false"),
                ("drmType", "widevine"),
                (cache_buster.as_str(), ""),
            ])
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .header(reqwest::header::REFERER, referer.as_str())
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        // The field is named videoLocation.url here too, but at this step it
        // carries the ticket, not a media URL.
        let location = Self::parse_video_location(&body, "readyNplay")?;
        Ok(location.url)
    }

    /// Resolves the direct media URL for one quality.
    pub async fn fetch_stream_url(&self, quality: u32) -> Result<String, ExtractorError> {
        let ticket = self.fetch_ticket().await?;
        let profile = Self::profile_for(quality);
        let referer = self.resolve_embed_url().await?;
        let url = format!(
            "{}/katz/v3/ft/cliplink/{}/videoLocation",
            self.play_base,
            self.clip_id()?
        );
        let response = self
            .extractor
            .get(&url)
            .query(&[
                ("tid", ticket.as_str()),
                ("profile", profile),
                ("contentType", "MP4"),
            ])
            .header(reqwest::header::REFERER, referer.as_str())
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        let location = Self::parse_video_location(&body, "videoLocation")?;
        debug!(quality, profile, url = %location.url, "resolved stream url");
        Ok(location.url)
    }

    async fn resolve_all(&self, qualities: &[u32]) -> Result<Vec<(u32, String)>, ExtractorError> {
        let fetches = qualities.iter().map(|&quality| async move {
            let url = self.fetch_stream_url(quality).await?;
            Ok::<_, ExtractorError>((quality, url))
        });
        try_join_all(fetches).await
    }

    /// Resolves all requested qualities concurrently.
    ///
    /// Each quality runs its own full chain (referer, ticket, location) with
    /// its own session id. The join is all-or-nothing: the first failing
    /// chain fails the batch and no partial mapping is returned.
    pub async fn extract_qualities(
        &self,
        qualities: &[u32],
    ) -> Result<FxHashMap<String, String>, ExtractorError> {
        let resolved = self.resolve_all(qualities).await?;
        Ok(resolved
            .into_iter()
            .map(|(quality, url)| (format!("{quality}p"), url))
            .collect())
    }
}

#[async_trait]
impl PlatformExtractor for KakaoTv {
    fn get_extractor(&self) -> &Extractor {
        &self.extractor
    }

    async fn extract(&self) -> Result<MediaInfo, ExtractorError> {
        let oembed = self.fetch_oembed().await?;
        let resolved = self.resolve_all(&self.qualities).await?;

        let streams = resolved
            .into_iter()
            .map(|(quality, url)| {
                let mut extras = FxHashMap::default();
                extras.insert(
                    "profile".to_string(),
                    Self::profile_for(quality).to_string(),
                );
                StreamInfo {
                    url,
                    format: MediaFormat::Mp4,
                    quality: format!("{quality}p"),
                    extras: Some(extras),
                }
            })
            .collect();

        let mut extras = FxHashMap::default();
        extras.insert("clipId".to_string(), self.clip_id()?.to_string());

        Ok(MediaInfo::builder(
            self.extractor.url.clone(),
            oembed.title.unwrap_or_default(),
            oembed.author_name.unwrap_or_default(),
        )
        .cover_url_opt(oembed.thumbnail_url)
        .is_live(false)
        .streams(streams)
        .extras(extras)
        .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_maps_onto_profiles() {
        assert_eq!(KakaoTv::profile_for(240), "LOW");
        assert_eq!(KakaoTv::profile_for(360), "BASE");
        assert_eq!(KakaoTv::profile_for(480), "MAIN");
        assert_eq!(KakaoTv::profile_for(720), "HIGH");
        assert_eq!(KakaoTv::profile_for(1080), "HIGH4");
    }

    #[test]
    fn off_ladder_qualities_degrade_to_default() {
        assert_eq!(KakaoTv::profile_for(144), "MAIN");
        assert_eq!(KakaoTv::profile_for(2160), "MAIN");
    }

    #[test]
    fn session_ids_are_16_byte_hex_and_unique() {
        let first = KakaoTv::player_session_id();
        let second = KakaoTv::player_session_id();
        assert_eq!(first.len(), 32);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(first, second);
    }

    #[test]
    fn extracts_iframe_src_from_fragment() {
        let html = r#"<iframe src="https://tv.kakao.com/embed/player/cliplink/477029600?service=player" width="640" height="360" allowfullscreen></iframe>"#;
        assert_eq!(
            capture_group_1(&IFRAME_SRC_REGEX, html),
            Some("https://tv.kakao.com/embed/player/cliplink/477029600?service=player")
        );
    }

    #[test]
    fn fragment_without_iframe_yields_nothing() {
        assert_eq!(
            capture_group_1(&IFRAME_SRC_REGEX, "<div>player unavailable</div>"),
            None
        );
    }

    #[test]
    fn clip_id_comes_from_the_public_url() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let kakao = KakaoTv::for_clip("477029600", Client::new());
        assert_eq!(kakao.clip_id().unwrap(), "477029600");
    }

    #[test]
    fn foreign_urls_are_invalid() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let kakao = KakaoTv::new(
            "https://example.com/watch?v=477029600".to_string(),
            Client::new(),
            None,
        );
        assert!(matches!(
            kakao.clip_id(),
            Err(ExtractorError::InvalidUrl(_))
        ));
    }

    #[test]
    fn missing_video_location_is_a_validation_error() {
        let result = KakaoTv::parse_video_location(r#"{"status": "NotFound"}"#, "readyNplay");
        assert!(matches!(result, Err(ExtractorError::ValidationError(_))));

        let ok = KakaoTv::parse_video_location(
            r#"{"videoLocation": {"url": "https://vod.example/HIGH.mp4"}}"#,
            "videoLocation",
        )
        .unwrap();
        assert_eq!(ok.url, "https://vod.example/HIGH.mp4");
    }

    #[test]
    fn platform_params_cover_the_shared_katz_fields() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let kakao = KakaoTv::for_clip("477029600", Client::new());
        assert_eq!(
            kakao.extractor.get_param("player").map(String::as_str),
            Some("monet_html5")
        );
        assert_eq!(
            kakao.extractor.get_param("service").map(String::as_str),
            Some("und_player")
        );
        assert_eq!(
            kakao.extractor.get_param("section").map(String::as_str),
            Some("und_player")
        );
        assert_eq!(
            kakao.extractor.get_param("dteType").map(String::as_str),
            Some("PC")
        );
    }

    #[test]
    fn qualities_come_from_extras() {
        let extras = serde_json::json!({ "qualities": [720, 1080] });
        assert_eq!(
            KakaoTv::qualities_from_extras(Some(&extras)),
            vec![720, 1080]
        );

        let extras = serde_json::json!({ "qualities": "480, 720" });
        assert_eq!(KakaoTv::qualities_from_extras(Some(&extras)), vec![480, 720]);

        assert_eq!(
            KakaoTv::qualities_from_extras(None),
            KakaoTv::DEFAULT_QUALITIES.to_vec()
        );
    }

    #[tokio::test]
    #[ignore]
    async fn extract_live_integration() {
        let kakao = KakaoTv::for_clip("300103180", crate::extractor::default_client());
        let urls = kakao.extract_qualities(&[720]).await.unwrap();
        println!("{urls:?}");
    }
}
