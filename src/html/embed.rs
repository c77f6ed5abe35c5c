//! Video URL → embed resolution, done when content is displayed.

use super::escape_attr;
use once_cell::sync::Lazy;
use regex::Regex;

static YOUTUBE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/(?:watch\?(?:.*&)?v=|embed/|shorts/|live/)|youtube-nocookie\.com/embed/|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .expect("valid youtube regex")
});

static VIMEO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:https?://)?(?:www\.|player\.)?vimeo\.com/(?:video/)?(\d+)")
        .expect("valid vimeo regex")
});

/// Where a video block's URL points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoEmbed {
    YouTube { id: String },
    Vimeo { id: String },
    /// Anything else is treated as a direct video file.
    File { url: String },
}

/// Classifies a stored video URL.
pub fn resolve_embed(url: &str) -> VideoEmbed {
    let url = url.trim();
    if let Some(id) = YOUTUBE.captures(url).and_then(|c| c.get(1)) {
        return VideoEmbed::YouTube {
            id: id.as_str().to_string(),
        };
    }
    if let Some(id) = VIMEO.captures(url).and_then(|c| c.get(1)) {
        return VideoEmbed::Vimeo {
            id: id.as_str().to_string(),
        };
    }
    VideoEmbed::File {
        url: url.to_string(),
    }
}

impl VideoEmbed {
    /// URL for an `<iframe>` (hosted players) or `<video>` (files).
    pub fn embed_url(&self) -> String {
        match self {
            Self::YouTube { id } => format!("https://www.youtube.com/embed/{}", id),
            Self::Vimeo { id } => format!("https://player.vimeo.com/video/{}", id),
            Self::File { url } => url.clone(),
        }
    }

    /// Display markup for this video.
    pub fn to_html(&self) -> String {
        match self {
            Self::File { url } => format!(
                r#"<video class="ql-video" src="{}" controls playsinline style="width: 100%;"></video>"#,
                escape_attr(url)
            ),
            _ => format!(
                r#"<iframe class="ql-video" src="{}" frameborder="0" allowfullscreen style="width: 100%; aspect-ratio: 16 / 9;"></iframe>"#,
                escape_attr(&self.embed_url())
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_variants() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=10",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
        ] {
            assert_eq!(
                resolve_embed(url),
                VideoEmbed::YouTube {
                    id: "dQw4w9WgXcQ".into()
                },
                "{}",
                url
            );
        }
    }

    #[test]
    fn vimeo_and_files() {
        assert_eq!(
            resolve_embed("https://vimeo.com/76979871").embed_url(),
            "https://player.vimeo.com/video/76979871"
        );
        let file = resolve_embed("https://cdn.example.test/reel.mp4");
        assert!(file.to_html().starts_with("<video"));
    }
}
