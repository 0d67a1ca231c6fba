// 📤 QR Export - download to disk, share via OS command, clipboard fallback

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

use crate::qr::{QrImage, EXPORT_FILE_NAME};

/// Title passed along with every share
pub const SHARE_TITLE: &str = "Mobile Price QR Code";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("share command '{program}' could not be started: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("share command '{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("failed to copy to clipboard: {0}")]
    Clipboard(String),

    #[error(transparent)]
    Export(#[from] ExportError),
}

// ============================================================================
// OUTCOMES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(PathBuf),
    /// Nothing generated yet
    NothingToExport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    CopiedToClipboard,
    /// Nothing generated yet
    NothingToShare,
}

impl ShareOutcome {
    /// Status line for the outcome; a no-op share has none
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ShareOutcome::Shared => Some("QR code shared!"),
            ShareOutcome::CopiedToClipboard => Some("QR code data copied to clipboard!"),
            ShareOutcome::NothingToShare => None,
        }
    }
}

// ============================================================================
// SHARE TARGETS
// ============================================================================

pub struct ShareRequest<'a> {
    pub title: &'a str,
    pub text: &'a str,
    pub file: &'a Path,
}

/// Something that can hand a file and caption to the operating system
pub trait ShareTarget {
    fn is_available(&self) -> bool;
    fn share(&self, request: &ShareRequest<'_>) -> Result<(), ShareError>;
}

/// No share integration configured
pub struct NoShareTarget;

impl ShareTarget for NoShareTarget {
    fn is_available(&self) -> bool {
        false
    }

    fn share(&self, _request: &ShareRequest<'_>) -> Result<(), ShareError> {
        Ok(())
    }
}

/// External command, e.g. `kdeconnect-cli --share {file}`.
///
/// `{file}`, `{title}` and `{text}` inside args are substituted per share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandShareTarget {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandShareTarget {
    fn render_args(&self, request: &ShareRequest<'_>) -> Vec<String> {
        let file = request.file.display().to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{file}", &file)
                    .replace("{title}", request.title)
                    .replace("{text}", request.text)
            })
            .collect()
    }
}

impl ShareTarget for CommandShareTarget {
    fn is_available(&self) -> bool {
        !self.program.is_empty()
    }

    /// The terminal belongs to the UI, so the child gets no stdin and its
    /// stdout is discarded. Stderr is captured for the error.
    fn share(&self, request: &ShareRequest<'_>) -> Result<(), ShareError> {
        let output = Command::new(&self.program)
            .args(self.render_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ShareError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ShareError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

// ============================================================================
// CLIPBOARD
// ============================================================================

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ShareError>;
}

/// System clipboard, opened lazily on first use
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ShareError> {
        if self.inner.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| ShareError::Clipboard(e.to_string()))?;
            self.inner = Some(clipboard);
        }

        match self.inner.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_string())
                .map_err(|e| ShareError::Clipboard(e.to_string())),
            None => Err(ShareError::Clipboard("clipboard unavailable".to_string())),
        }
    }
}

// ============================================================================
// EXPORTER
// ============================================================================

pub struct Exporter {
    export_dir: PathBuf,
}

impl Exporter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Exporter {
            export_dir: export_dir.into(),
        }
    }

    pub fn export_path(&self) -> PathBuf {
        self.export_dir.join(EXPORT_FILE_NAME)
    }

    /// Save the image as `mobile-price-qr.png`. No-op without an image.
    pub fn download(&self, image: Option<&QrImage>) -> Result<ExportOutcome, ExportError> {
        let Some(image) = image else {
            return Ok(ExportOutcome::NothingToExport);
        };

        let path = self.write_png(image)?;
        tracing::info!(path = %path.display(), "saved QR code");
        Ok(ExportOutcome::Saved(path))
    }

    /// Share image and caption, falling back to copying the caption.
    /// No-op without an image.
    pub fn share(
        &self,
        image: Option<&QrImage>,
        target: &dyn ShareTarget,
        clipboard: &mut dyn Clipboard,
    ) -> Result<ShareOutcome, ShareError> {
        let Some(image) = image else {
            return Ok(ShareOutcome::NothingToShare);
        };

        if target.is_available() {
            match self.write_png(image) {
                Ok(path) => {
                    let request = ShareRequest {
                        title: SHARE_TITLE,
                        text: image.payload(),
                        file: &path,
                    };

                    match target.share(&request) {
                        Ok(()) => {
                            tracing::info!(path = %path.display(), "shared QR code");
                            return Ok(ShareOutcome::Shared);
                        }
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                "share failed, copying payload to clipboard"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "could not write QR code for sharing, copying payload to clipboard"
                    );
                }
            }
        } else {
            tracing::debug!("no share target available, copying payload to clipboard");
        }

        clipboard.set_text(image.payload())?;
        tracing::info!("copied QR payload to clipboard");
        Ok(ShareOutcome::CopiedToClipboard)
    }

    fn write_png(&self, image: &QrImage) -> Result<PathBuf, ExportError> {
        let path = self.export_path();
        fs::create_dir_all(&self.export_dir).map_err(|source| ExportError::Io {
            path: self.export_dir.clone(),
            source,
        })?;
        fs::write(&path, image.png_bytes()).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::{encode, QrStyle};
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeClipboard {
        text: Option<String>,
        fail: bool,
    }

    impl Clipboard for FakeClipboard {
        fn set_text(&mut self, text: &str) -> Result<(), ShareError> {
            if self.fail {
                return Err(ShareError::Clipboard("no display".to_string()));
            }
            self.text = Some(text.to_string());
            Ok(())
        }
    }

    struct FakeTarget {
        available: bool,
        fail: bool,
        shared: RefCell<Vec<(String, String, PathBuf)>>,
    }

    impl FakeTarget {
        fn new(available: bool, fail: bool) -> Self {
            FakeTarget {
                available,
                fail,
                shared: RefCell::new(Vec::new()),
            }
        }
    }

    impl ShareTarget for FakeTarget {
        fn is_available(&self) -> bool {
            self.available
        }

        fn share(&self, request: &ShareRequest<'_>) -> Result<(), ShareError> {
            if self.fail {
                return Err(ShareError::Failed {
                    program: "fake".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: String::new(),
                });
            }
            self.shared.borrow_mut().push((
                request.title.to_string(),
                request.text.to_string(),
                request.file.to_path_buf(),
            ));
            Ok(())
        }
    }

    fn sample() -> QrImage {
        encode("Mobile Price: $1,125", &QrStyle::default()).unwrap()
    }

    #[test]
    fn test_download_without_image_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());

        assert_eq!(exporter.download(None).unwrap(), ExportOutcome::NothingToExport);
        assert!(!exporter.export_path().exists());
    }

    #[test]
    fn test_download_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let image = sample();

        let outcome = exporter.download(Some(&image)).unwrap();
        let path = dir.path().join("mobile-price-qr.png");
        assert_eq!(outcome, ExportOutcome::Saved(path.clone()));
        assert_eq!(fs::read(&path).unwrap(), image.png_bytes());
    }

    #[test]
    fn test_download_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path().join("nested").join("out"));

        let outcome = exporter.download(Some(&sample())).unwrap();
        assert!(matches!(outcome, ExportOutcome::Saved(p) if p.exists()));
    }

    #[test]
    fn test_share_without_image_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let target = FakeTarget::new(true, false);
        let mut clipboard = FakeClipboard::default();

        let outcome = exporter.share(None, &target, &mut clipboard).unwrap();
        assert_eq!(outcome, ShareOutcome::NothingToShare);
        assert_eq!(outcome.message(), None);
        assert!(target.shared.borrow().is_empty());
        assert!(clipboard.text.is_none());
    }

    #[test]
    fn test_share_uses_target_when_available() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let target = FakeTarget::new(true, false);
        let mut clipboard = FakeClipboard::default();

        let outcome = exporter.share(Some(&sample()), &target, &mut clipboard).unwrap();
        assert_eq!(outcome, ShareOutcome::Shared);

        let shared = target.shared.borrow();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].0, SHARE_TITLE);
        assert_eq!(shared[0].1, "Mobile Price: $1,125");
        assert!(shared[0].2.ends_with("mobile-price-qr.png"));
        assert!(clipboard.text.is_none());
    }

    #[test]
    fn test_share_unavailable_falls_back_to_clipboard() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let mut clipboard = FakeClipboard::default();

        let outcome = exporter
            .share(Some(&sample()), &NoShareTarget, &mut clipboard)
            .unwrap();
        assert_eq!(outcome, ShareOutcome::CopiedToClipboard);
        assert_eq!(clipboard.text.as_deref(), Some("Mobile Price: $1,125"));
    }

    #[test]
    fn test_share_failure_falls_back_to_clipboard() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let target = FakeTarget::new(true, true);
        let mut clipboard = FakeClipboard::default();

        let outcome = exporter.share(Some(&sample()), &target, &mut clipboard).unwrap();
        assert_eq!(outcome, ShareOutcome::CopiedToClipboard);
        assert_eq!(clipboard.text.as_deref(), Some("Mobile Price: $1,125"));
    }

    #[test]
    fn test_clipboard_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let mut clipboard = FakeClipboard {
            text: None,
            fail: true,
        };

        let err = exporter
            .share(Some(&sample()), &NoShareTarget, &mut clipboard)
            .unwrap_err();
        assert!(matches!(err, ShareError::Clipboard(_)));
    }

    #[test]
    fn test_command_args_substitution() {
        let target = CommandShareTarget {
            program: "share".to_string(),
            args: vec![
                "--file={file}".to_string(),
                "{title}".to_string(),
                "{text}".to_string(),
            ],
        };
        let path = PathBuf::from("/tmp/mobile-price-qr.png");
        let request = ShareRequest {
            title: SHARE_TITLE,
            text: "Mobile Price: $56",
            file: &path,
        };

        assert_eq!(
            target.render_args(&request),
            vec![
                "--file=/tmp/mobile-price-qr.png".to_string(),
                "Mobile Price QR Code".to_string(),
                "Mobile Price: $56".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_command_falls_back_to_clipboard() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let target = CommandShareTarget {
            program: "definitely-not-a-real-share-command".to_string(),
            args: vec![],
        };
        let mut clipboard = FakeClipboard::default();

        let outcome = exporter.share(Some(&sample()), &target, &mut clipboard).unwrap();
        assert_eq!(outcome, ShareOutcome::CopiedToClipboard);
    }

    #[test]
    fn test_unwritable_export_dir_falls_back_to_clipboard() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"not a directory").unwrap();
        let exporter = Exporter::new(blocker.join("sub"));
        let target = FakeTarget::new(true, false);
        let mut clipboard = FakeClipboard::default();

        let outcome = exporter.share(Some(&sample()), &target, &mut clipboard).unwrap();
        assert_eq!(outcome, ShareOutcome::CopiedToClipboard);
        assert_eq!(clipboard.text.as_deref(), Some("Mobile Price: $1,125"));
        assert!(target.shared.borrow().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_output_is_not_inherited() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let marker = dir.path().join("ran");
        let target = CommandShareTarget {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                format!("echo shared {{text}}; read line; touch '{}'", marker.display()),
            ],
        };
        let mut clipboard = FakeClipboard::default();

        let outcome = exporter.share(Some(&sample()), &target, &mut clipboard).unwrap();
        assert_eq!(outcome, ShareOutcome::Shared);
        assert!(marker.exists());
        assert!(clipboard.text.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_failure_carries_stderr() {
        let target = CommandShareTarget {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "echo broken >&2; exit 3".to_string()],
        };
        let path = PathBuf::from("/tmp/mobile-price-qr.png");
        let request = ShareRequest {
            title: SHARE_TITLE,
            text: "Mobile Price: $56",
            file: &path,
        };

        match target.share(&request).unwrap_err() {
            ShareError::Failed { program, stderr, .. } => {
                assert_eq!(program, "sh");
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
