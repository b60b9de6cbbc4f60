//! Downloadable project archive: the three sources as a zstd-compressed tar.

use chrono::{DateTime, Utc};
use tar::{Builder, Header};
use zstd::stream::write::Encoder as ZstdEncoder;

use crate::error::ArchiveError;
use crate::project::{SourceKind, SourceTexts};

pub const ARCHIVE_FILE_NAME: &str = "lca-playground-project.tar.zst";
pub const ARCHIVE_MIME_TYPE: &str = "application/zstd";

const COMPRESSION_LEVEL: i32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub file_name: &'static str,
    pub bytes: Vec<u8>,
}

pub fn build_archive(
    sources: &SourceTexts,
    modified_at: DateTime<Utc>,
) -> Result<Archive, ArchiveError> {
    let encoder = ZstdEncoder::new(Vec::new(), COMPRESSION_LEVEL).map_err(ArchiveError::Encoder)?;
    let mut tar = Builder::new(encoder);

    for kind in SourceKind::ALL {
        let contents = sources.get(kind).as_bytes();
        let mut header = Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(modified_at.timestamp().max(0) as u64);
        tar.append_data(&mut header, kind.file_name(), contents)
            .map_err(|source| ArchiveError::Entry {
                entry: kind.file_name(),
                source,
            })?;
    }

    // Finish tar, then finish zstd stream
    let encoder = tar.into_inner().map_err(ArchiveError::Finish)?;
    let bytes = encoder.finish().map_err(ArchiveError::Finish)?;
    log::debug!("Built {ARCHIVE_FILE_NAME} ({} bytes)", bytes.len());

    Ok(Archive {
        file_name: ARCHIVE_FILE_NAME,
        bytes,
    })
}
