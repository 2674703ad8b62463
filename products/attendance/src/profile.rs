//! Profile images as self-contained data URLs.
//!
//! Neither size nor content type is checked here; the form's `image/*`
//! picker filter is the only gate.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::{AttendanceError, AttendanceResult};

/// Media type used when the upload did not declare one.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// `data:<mime>;base64,<payload>`
pub fn encode_data_url(mime: Option<&str>, bytes: &[u8]) -> String {
    let mime = mime
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(FALLBACK_MIME);
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Guess an image media type from a file extension. Non-image types are
/// not reported.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path)
        .first_raw()
        .filter(|mime| mime.starts_with("image/"))
}

/// Reads a whole file and encodes it.
pub async fn read_data_url(path: &Path) -> AttendanceResult<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| AttendanceError::ProfileRead {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(encode_data_url(mime_from_extension(path), &bytes))
}

/// Handed out when a profile read starts; the read's result is only applied
/// while the token is still current.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProfileReadToken(u64);

#[derive(Clone, Debug, Default)]
pub(crate) struct ProfileReads {
    generation: u64,
}

impl ProfileReads {
    pub(crate) fn begin(&mut self) -> ProfileReadToken {
        self.generation += 1;
        ProfileReadToken(self.generation)
    }

    /// Orphans every read still in flight.
    pub(crate) fn invalidate(&mut self) {
        self.generation += 1;
    }

    pub(crate) fn is_current(&self, token: ProfileReadToken) -> bool {
        token.0 == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_with_declared_type() {
        assert_eq!(
            encode_data_url(Some("image/png"), b"\x89PNG"),
            "data:image/png;base64,iVBORw=="
        );
    }

    #[test]
    fn blank_type_falls_back() {
        assert_eq!(
            encode_data_url(Some(" "), b"hi"),
            "data:application/octet-stream;base64,aGk="
        );
    }

    #[test]
    fn extension_lookup_ignores_case() {
        assert_eq!(mime_from_extension(Path::new("me.JPG")), Some("image/jpeg"));
        assert_eq!(mime_from_extension(Path::new("logo.svg")), Some("image/svg+xml"));
        assert_eq!(mime_from_extension(Path::new("notes.txt")), None);
        assert_eq!(mime_from_extension(Path::new("no-extension")), None);
    }

    #[test]
    fn only_latest_read_is_current() {
        let mut reads = ProfileReads::default();
        let first = reads.begin();
        let second = reads.begin();
        assert!(!reads.is_current(first));
        assert!(reads.is_current(second));
        reads.invalidate();
        assert!(!reads.is_current(second));
    }

    #[tokio::test]
    async fn missing_file_reports_its_path() {
        let err = read_data_url(Path::new("/nonexistent/avatar.png"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/avatar.png"));
    }
}
