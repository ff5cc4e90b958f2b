use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Media types accepted by the upload pipeline.
///
/// Anything outside this set is rejected before it reaches storage, so there is
/// no catch-all variant: parsing an unknown MIME type yields `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaType {
    // Images
    Jpeg,
    Png,
    Webp,
    Gif,
    Avif,
    // Videos
    Mp4,
    QuickTime,
    Avi,
    WebmVideo,
}

impl MediaType {
    pub const ALL: [MediaType; 9] = [
        Self::Jpeg,
        Self::Png,
        Self::Webp,
        Self::Gif,
        Self::Avif,
        Self::Mp4,
        Self::QuickTime,
        Self::Avi,
        Self::WebmVideo,
    ];

    /// MIME type string (e.g., "image/jpeg", "video/mp4").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
            Self::Avif => "image/avif",
            Self::Mp4 => "video/mp4",
            Self::QuickTime => "video/quicktime",
            Self::Avi => "video/x-msvideo",
            Self::WebmVideo => "video/webm",
        }
    }

    /// Parse a declared MIME type. Matching is exact, as browsers report it.
    pub fn from_mime(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// The part after the slash ("jpeg", "quicktime", "x-msvideo").
    pub fn subtype(&self) -> &'static str {
        let mime = self.as_str();
        match mime.split_once('/') {
            Some((_, sub)) => sub,
            None => mime,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(
            self,
            Self::Mp4 | Self::QuickTime | Self::Avi | Self::WebmVideo
        )
    }

    pub fn is_image(&self) -> bool {
        !self.is_video()
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MediaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MediaType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MediaType::from_mime(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unsupported media type: {s}")))
    }
}
