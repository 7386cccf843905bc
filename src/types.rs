use crate::errors::{AutomationError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "wmv", "flv", "mkv", "webm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn supported_extensions(self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => IMAGE_EXTENSIONS,
            MediaKind::Video => VIDEO_EXTENSIONS,
        }
    }

    /// Derive the media kind from a file extension, if it is supported at all.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// A media file queued for upload. The path is absolutized on construction
/// and the extension is checked against the declared kind; existence is
/// re-checked right before the file is fed to the page, since files can
/// disappear between queueing and upload.
#[derive(Debug, Clone)]
pub struct Attachment {
    path: PathBuf,
    kind: MediaKind,
}

impl Attachment {
    pub fn new(path: impl Into<PathBuf>, kind: MediaKind) -> Result<Self> {
        let path = std::path::absolute(path.into())?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !kind.supported_extensions().contains(&ext.as_str()) {
            return Err(AutomationError::UnsupportedMedia(format!(
                "{} is not a supported {:?} extension",
                path.display(),
                kind
            )));
        }
        Ok(Self { path, kind })
    }

    /// Build an attachment with the kind inferred from the file extension.
    pub fn infer(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let kind = MediaKind::from_path(&path).ok_or_else(|| {
            AutomationError::UnsupportedMedia(format!("{}", path.display()))
        })?;
        Attachment::new(path, kind)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

/// Terminal result of one login attempt. A failed attempt is never retried
/// internally; the caller decides whether to run the automaton again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    Failure,
    /// The verification checkpoint was still showing when the manual
    /// intervention window closed.
    CheckpointTimedOut,
}

impl LoginOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, LoginOutcome::Success)
    }
}

/// Terminal result of one post composition. `Success` means the publish
/// control was clicked; the post is not confirmed server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    Success,
    ComposerNotFound,
    SubmitNotFound,
    AttachmentFailed,
}

impl PostOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, PostOutcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_from_extension() {
        assert_eq!(
            MediaKind::from_path(Path::new("photo.JPG")),
            Some(MediaKind::Image)
        );
        assert_eq!(
            MediaKind::from_path(Path::new("clip.webm")),
            Some(MediaKind::Video)
        );
        assert_eq!(MediaKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(MediaKind::from_path(Path::new("no_extension")), None);
    }

    #[test]
    fn attachment_rejects_mismatched_kind() {
        let err = Attachment::new("movie.mp4", MediaKind::Image).unwrap_err();
        assert!(matches!(err, AutomationError::UnsupportedMedia(_)));
    }

    #[test]
    fn attachment_infers_kind_and_absolutizes() {
        let att = Attachment::infer("uploads/photo.png").unwrap();
        assert_eq!(att.kind(), MediaKind::Image);
        assert!(att.path().is_absolute());
    }

    #[test]
    fn attachment_rejects_unsupported_extension() {
        assert!(Attachment::infer("document.pdf").is_err());
    }

    #[test]
    fn missing_file_reports_not_existing() {
        let att = Attachment::infer("/nonexistent/never/photo.jpg").unwrap();
        assert!(!att.exists());
    }
}
