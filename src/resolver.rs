//! Video link resolution.
//!
//! Maps YouTube sharing links to their video identifier and to the static thumbnail image the
//! host serves for it. Nothing here touches the network.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::Error;

static VIDEO_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?(?:youtube\.com|youtu\.be)/(?:watch\?v=)?(.+)")
        .expect("video url pattern")
});

static QUERY_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&].*").expect("query pattern"));

/// Identifier of a hosted video, as found in its sharing links.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Wraps an identifier that is already known, without parsing.
    ///
    /// Fails with [`Error::InvalidUrl`] when `id` is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidUrl);
        }
        Ok(VideoId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Thumbnail image for this video.
    pub fn thumbnail_url(&self) -> String {
        format!("https://img.youtube.com/vi/{}/0.jpg", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extracts the video identifier from a watch link (`youtube.com/watch?v=<id>`) or a short
/// link (`youtu.be/<id>`).
///
/// The scheme and `www.` prefix are optional. Anything from the first `?` or `&` after the
/// identifier is dropped, so playlist, index, share and timestamp parameters are ignored.
pub fn extract_video_id(url: &str) -> Result<VideoId, Error> {
    let candidate = VIDEO_URL
        .captures(url)
        .and_then(|captures| captures.get(1))
        .ok_or(Error::InvalidUrl)?;

    VideoId::new(QUERY_TAIL.replace(candidate.as_str(), ""))
}

/// Thumbnail image of the video a link points to.
pub fn thumbnail_url_for_video(url: &str) -> Result<String, Error> {
    extract_video_id(url).map(|id| id.thumbnail_url())
}

/// Thumbnail image of a bare video identifier. The identifier is not parsed.
pub fn thumbnail_url_for_id(id: &str) -> Result<String, Error> {
    VideoId::new(id).map(|id| id.thumbnail_url())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHARED: &str = "https://youtu.be/3fv0iVcCeh4?si=BbDEyYoitc3SX3nE";
    const WATCH: &str = "https://www.youtube.com/watch?v=3fv0iVcCeh4";
    const PLAYLIST: &str =
        "https://www.youtube.com/watch?v=tO8aJ-TUtJY&list=PL96C35uN7xGJu6skU4TBYrIWxggkZBrF5&index=1&t=12s";
    const TIMESTAMP: &str = "www.youtube.com/watch?v=3fv0iVcCeh4&t=12s";
    const SHARED_TIMESTAMP: &str = "https://youtu.be/3fv0iVcCeh4?si=BbDEyYoitc3SX3nE&t=12s";

    #[test]
    fn resolves_every_link_form() {
        for url in [SHARED, WATCH, TIMESTAMP, SHARED_TIMESTAMP, "http://youtube.com/watch?v=3fv0iVcCeh4"] {
            assert_eq!(extract_video_id(url).unwrap().as_str(), "3fv0iVcCeh4", "{url}");
        }
        assert_eq!(extract_video_id(PLAYLIST).unwrap().as_str(), "tO8aJ-TUtJY");
    }

    #[test]
    fn rejects_links_without_video() {
        assert!(matches!(extract_video_id("https://www.youtube.com/"), Err(Error::InvalidUrl)));
        assert!(matches!(extract_video_id("https://www.youtube.com/?feature=share"), Err(Error::InvalidUrl)));
        assert!(matches!(extract_video_id("https://vimeo.com/12345"), Err(Error::InvalidUrl)));
        assert!(matches!(extract_video_id("see https://youtu.be/3fv0iVcCeh4"), Err(Error::InvalidUrl)));
        assert!(matches!(extract_video_id(""), Err(Error::InvalidUrl)));
    }

    #[test]
    fn thumbnail_follows_extracted_id() {
        for url in [SHARED, WATCH, PLAYLIST, TIMESTAMP, SHARED_TIMESTAMP] {
            let id = extract_video_id(url).unwrap();
            assert_eq!(
                thumbnail_url_for_video(url).unwrap(),
                format!("https://img.youtube.com/vi/{id}/0.jpg")
            );
        }
        assert!(matches!(thumbnail_url_for_video("https://www.youtube.com/"), Err(Error::InvalidUrl)));
    }

    #[test]
    fn bare_id_skips_parsing() {
        assert_eq!(
            thumbnail_url_for_id("3fv0iVcCeh4").unwrap(),
            "https://img.youtube.com/vi/3fv0iVcCeh4/0.jpg"
        );
        // would not survive extraction: no host, and a query-like tail
        assert_eq!(
            thumbnail_url_for_id("abc?def").unwrap(),
            "https://img.youtube.com/vi/abc?def/0.jpg"
        );
        assert!(matches!(thumbnail_url_for_id(""), Err(Error::InvalidUrl)));
    }
}
