//! Playlist acquisition guard.
//!
//! Validates a suggested filename before any parsing happens; the actual
//! file reading is an external collaborator's job.

use super::PlaylistError;

/// Raw playlist text plus the name it arrived under.
///
/// Construction rejects filenames with the wrong extension, so a value of
/// this type is always safe to hand to the parser.
#[derive(Debug, Clone)]
pub struct PlaylistUpload {
    pub suggested_name: String,
    pub text: String,
}

impl PlaylistUpload {
    /// Accepts playlist text under a suggested filename.
    ///
    /// # Errors
    ///
    /// - `PlaylistError::UnsupportedExtension` - Filename does not end in
    ///   the expected extension (matched case-insensitively)
    pub fn new(
        suggested_name: impl Into<String>,
        text: impl Into<String>,
        accepted_extension: &str,
    ) -> Result<Self, PlaylistError> {
        let suggested_name = suggested_name.into();
        let matches = suggested_name
            .len()
            .checked_sub(accepted_extension.len())
            .and_then(|start| suggested_name.get(start..))
            .is_some_and(|suffix| suffix.eq_ignore_ascii_case(accepted_extension));
        if !matches {
            return Err(PlaylistError::UnsupportedExtension {
                filename: suggested_name,
            });
        }

        Ok(Self {
            suggested_name,
            text: text.into(),
        })
    }
}
