use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MediaRefError {
    #[error("media reference cannot be empty")]
    Empty,

    #[error("media reference is not a valid URL: {0}")]
    InvalidUrl(String),
}

/// Where a thumbnail or lecture video lives.
///
/// Playback is a direct file reference, so this is either a hosted URL or a
/// path the media element can open as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    Url(Url),
    FilePath(PathBuf),
}

impl MediaRef {
    /// Parses a stored reference: anything with a scheme is a URL, the rest a path.
    ///
    /// # Errors
    ///
    /// Returns `MediaRefError::Empty` for blank input, `InvalidUrl` when a
    /// scheme is present but the URL does not parse.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, MediaRefError> {
        let s = raw.as_ref().trim();
        if s.is_empty() {
            return Err(MediaRefError::Empty);
        }
        if s.contains("://") {
            let url = Url::parse(s).map_err(|_| MediaRefError::InvalidUrl(s.to_owned()))?;
            return Ok(Self::Url(url));
        }
        Ok(Self::FilePath(PathBuf::from(s)))
    }

    #[must_use]
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            MediaRef::Url(u) => Some(u),
            MediaRef::FilePath(_) => None,
        }
    }

    #[must_use]
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            MediaRef::FilePath(p) => Some(p.as_path()),
            MediaRef::Url(_) => None,
        }
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaRef::Url(u) => write!(f, "{u}"),
            MediaRef::FilePath(p) => write!(f, "{}", p.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schemes_parse_as_urls() {
        let media = MediaRef::parse("https://cdn.example.com/videos/intro.mp4").unwrap();
        assert_eq!(
            media.as_url().map(Url::host_str),
            Some(Some("cdn.example.com"))
        );
    }

    #[test]
    fn stored_text_parses_back_to_the_same_reference() {
        let video = MediaRef::parse(
            "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4",
        )
        .unwrap();
        assert_eq!(MediaRef::parse(video.to_string()), Ok(video.clone()));
        assert_eq!(video.as_path(), None);
    }

    #[test]
    fn bare_paths_stay_paths() {
        let media = MediaRef::parse(" videos/intro.mp4 ").unwrap();
        assert_eq!(media.as_path(), Some(Path::new("videos/intro.mp4")));
        assert_eq!(media.to_string(), "videos/intro.mp4");
    }

    #[test]
    fn rejects_blank_and_broken_urls() {
        assert_eq!(MediaRef::parse("   "), Err(MediaRefError::Empty));
        assert!(matches!(
            MediaRef::parse("https://"),
            Err(MediaRefError::InvalidUrl(_))
        ));
    }
}
