use serde::Deserialize;

/// Response of the oEmbed endpoint.
///
/// Besides the embeddable `html` fragment this carries the clip metadata
/// published for third-party embedding.
#[derive(Debug, Deserialize)]
pub struct OembedResponse {
    pub html: String,
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Response of the KATZ `readyNplay` and `videoLocation` endpoints.
///
/// Both endpoints answer with the same envelope. On `readyNplay` the
/// `videoLocation.url` field holds the playback ticket (upstream naming);
/// on `videoLocation` it is the direct media URL.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KatzResponse {
    pub video_location: Option<VideoLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoLocation {
    pub url: String,
    pub profile: Option<String>,
    pub content_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_oembed_response() {
        let body = r#"{
            "type": "video",
            "title": "Sample Clip",
            "author_name": "Sample Channel",
            "thumbnail_url": "https://img1.kakaocdn.net/thumb/sample.jpg",
            "html": "<iframe src=\"https://tv.kakao.com/embed/player/cliplink/477029600?service=player\" width=\"640\" height=\"360\"></iframe>"
        }"#;
        let parsed: OembedResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.title.as_deref(), Some("Sample Clip"));
        assert_eq!(parsed.author_name.as_deref(), Some("Sample Channel"));
        assert!(parsed.html.contains("<iframe"));
    }

    #[test]
    fn parses_video_location_envelope() {
        let body = r#"{
            "videoLocation": {
                "url": "https://vod-kakao.example/sample.mp4",
                "profile": "HIGH",
                "contentType": "MP4"
            }
        }"#;
        let parsed: KatzResponse = serde_json::from_str(body).unwrap();
        let location = parsed.video_location.unwrap();
        assert_eq!(location.url, "https://vod-kakao.example/sample.mp4");
        assert_eq!(location.profile.as_deref(), Some("HIGH"));
        assert_eq!(location.content_type.as_deref(), Some("MP4"));
    }

    #[test]
    fn tolerates_missing_video_location() {
        let parsed: KatzResponse = serde_json::from_str(r#"{"status": "NotFound"}"#).unwrap();
        assert!(parsed.video_location.is_none());
    }
}
