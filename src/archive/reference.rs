//! Remote archive references.
//!
//! An [`ArchiveReference`] is what a metadata round-trip resolves an
//! identifier to: where the archive can be downloaded from and how many bytes
//! it has. It is resolved again on every fetch and never cached.

use crate::error::{Error, Result};

use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File extension of the archives served by the catalog.
pub const ARCHIVE_EXTENSION: &str = ".tar.gz";

/// Metadata the service returns for an archive.
///
/// Only `size` drives the transfer; the other fields describe which
/// collection (and dataset, when there is one) the archive bundles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArchiveInfo {
    /// Identifier of the collection bundled in the archive.
    #[serde(default)]
    pub collection: Option<String>,
    /// Identifier of the dataset the collection belongs to.
    #[serde(default)]
    pub dataset: Option<String>,
    /// Archive length in bytes.
    pub size: u64,
}

/// A resolved remote archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReference {
    /// Identifier of the archive (usually a collection id).
    pub identifier: String,
    /// URL the archive bytes are fetched from.
    pub url: Url,
    /// Remote byte length.
    pub size: u64,
    /// Metadata payload the reference was resolved from.
    pub info: ArchiveInfo,
}

impl ArchiveReference {
    /// Create a reference from a download URL and the metadata payload.
    pub fn new(identifier: &str, url: Url, info: ArchiveInfo) -> Self {
        Self {
            identifier: identifier.to_string(),
            url,
            size: info.size,
            info,
        }
    }

    /// File name of the archive on disk.
    pub fn filename(&self) -> String {
        archive_filename(&self.identifier)
    }

    /// Path of the archive inside `directory`.
    pub fn target_path(&self, directory: &Path) -> PathBuf {
        directory.join(self.filename())
    }
}

/// File name used to store the archive of `identifier`.
///
/// ```rust
/// use mlhub_archive::archive::archive_filename;
///
/// assert_eq!(archive_filename("sn1_AOI_1_RIO"), "sn1_AOI_1_RIO.tar.gz");
/// ```
pub fn archive_filename(identifier: &str) -> String {
    format!("{}{}", identifier, ARCHIVE_EXTENSION)
}

/// Reject identifiers that cannot safely name a file in the destination
/// directory.
pub fn validate_identifier(identifier: &str) -> Result<()> {
    let invalid = identifier.trim().is_empty()
        || identifier == "."
        || identifier == ".."
        || identifier.contains(['/', '\\'])
        || identifier.chars().any(char::is_control);

    if invalid {
        return Err(Error::InvalidIdentifier(identifier.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_reference(size: u64) -> ArchiveReference {
        let url = Url::parse("https://api.radiant.earth/mlhub/v1/archive/sn1_AOI_1_RIO").unwrap();
        let info = ArchiveInfo {
            collection: Some("sn1_AOI_1_RIO".into()),
            dataset: Some("spacenet1".into()),
            size,
        };
        ArchiveReference::new("sn1_AOI_1_RIO", url, info)
    }

    #[test]
    fn test_target_path() {
        let reference = create_test_reference(3_496_900_000);
        assert_eq!(reference.size, 3_496_900_000);
        assert_eq!(
            reference.target_path(Path::new("/data")),
            PathBuf::from("/data/sn1_AOI_1_RIO.tar.gz")
        );
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("sn1_AOI_1_RIO").is_ok());
        assert!(validate_identifier("ref_african_crops_kenya_02_labels").is_ok());

        for bad in ["", "   ", ".", "..", "a/b", "..\\x", "tab\there"] {
            assert!(
                matches!(validate_identifier(bad), Err(Error::InvalidIdentifier(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_archive_info_deserialize() {
        let info: ArchiveInfo = serde_json::from_str(
            r#"{"collection": "bigearthnet_v1_labels", "dataset": "bigearthnet_v1", "size": 173029030}"#,
        )
        .unwrap();
        assert_eq!(info.size, 173_029_030);
        assert_eq!(info.dataset.as_deref(), Some("bigearthnet_v1"));

        let info: ArchiveInfo = serde_json::from_str(r#"{"size": 10}"#).unwrap();
        assert_eq!(info.collection, None);

        assert!(serde_json::from_str::<ArchiveInfo>(r#"{"collection": "x"}"#).is_err());
    }
}
