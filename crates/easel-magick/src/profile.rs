//! Static argv templates for the three conversions the proxy performs.
//!
//! The pipeline itself is profile-agnostic; a [`Profile`] only decides the
//! argument vector handed to the converter executable.

use std::path::PathBuf;

/// One conversion recipe for the external converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Profile {
    /// Scale down and crop the center square before upload: JPEG in, PNG out,
    /// alpha channel removed (the provider rejects images with transparency
    /// of the wrong shape).
    Normalize { size: String },

    /// Plain format transcode of a downloaded result: PNG in, JPEG out.
    Transcode,

    /// Composite a branding overlay onto a downloaded result, then transcode:
    /// PNG in, JPEG out.
    Watermark { overlay: PathBuf },
}

impl Profile {
    /// Pre-upload normalization to a `"WxH"` square.
    pub fn normalize(size: impl Into<String>) -> Self {
        Profile::Normalize { size: size.into() }
    }

    /// Post-download transcode to JPEG.
    pub fn transcode() -> Self {
        Profile::Transcode
    }

    /// Post-download watermark composite, then transcode to JPEG.
    pub fn watermark(overlay: impl Into<PathBuf>) -> Self {
        Profile::Watermark {
            overlay: overlay.into(),
        }
    }

    /// The converter argument vector for this profile.
    ///
    /// `-` in the format specifiers means stdin/stdout; the converter never
    /// touches the filesystem except for the watermark overlay.
    pub fn argv(&self) -> Vec<String> {
        match self {
            Profile::Normalize { size } => vec![
                "jpeg:-".to_owned(),
                "-thumbnail".to_owned(),
                format!("{size}^"),
                "-gravity".to_owned(),
                "center".to_owned(),
                "-extent".to_owned(),
                size.clone(),
                "-alpha".to_owned(),
                "off".to_owned(),
                "png:-".to_owned(),
            ],
            Profile::Transcode => vec!["png:-".to_owned(), "jpeg:-".to_owned()],
            Profile::Watermark { overlay } => vec![
                "png:-".to_owned(),
                overlay.to_string_lossy().into_owned(),
                "-gravity".to_owned(),
                "southeast".to_owned(),
                "-composite".to_owned(),
                "jpeg:-".to_owned(),
            ],
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_argv_crops_to_requested_square() {
        assert_eq!(
            Profile::normalize("512x512").argv(),
            vec![
                "jpeg:-",
                "-thumbnail",
                "512x512^",
                "-gravity",
                "center",
                "-extent",
                "512x512",
                "-alpha",
                "off",
                "png:-",
            ]
        );
    }

    #[test]
    fn transcode_argv_is_a_plain_png_to_jpeg_filter() {
        assert_eq!(Profile::transcode().argv(), vec!["png:-", "jpeg:-"]);
    }

    #[test]
    fn watermark_argv_composites_the_overlay_before_transcoding() {
        assert_eq!(
            Profile::watermark("/opt/brand/watermark.png").argv(),
            vec![
                "png:-",
                "/opt/brand/watermark.png",
                "-gravity",
                "southeast",
                "-composite",
                "jpeg:-",
            ]
        );
    }
}
