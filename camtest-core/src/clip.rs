//! Recorded and selected clips

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Where a staged clip came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipSource {
    /// Synthesized from encoder chunks
    Recorded {
        /// Number of non-empty chunks that were concatenated
        chunk_count: usize,
    },
    /// Supplied directly from a file picker
    Selected {
        /// Name of the selected file
        file_name: String,
    },
}

/// A finalized, immutable video artifact
///
/// The payload is reference counted, so cloning a clip never copies the
/// video data.
#[derive(Debug, Clone)]
pub struct RecordedClip {
    data: Bytes,
    mime_type: String,
    source: ClipSource,
    created_at: DateTime<Utc>,
}

impl RecordedClip {
    /// Concatenate encoder chunks into one clip
    pub fn from_chunks(chunks: &[Bytes], mime_type: &str) -> Self {
        let total: usize = chunks.iter().map(Bytes::len).sum();
        let mut data = Vec::with_capacity(total);
        for chunk in chunks {
            data.extend_from_slice(chunk);
        }
        Self {
            data: Bytes::from(data),
            mime_type: mime_type.to_string(),
            source: ClipSource::Recorded {
                chunk_count: chunks.len(),
            },
            created_at: Utc::now(),
        }
    }

    /// Wrap a file chosen from local storage
    pub fn from_file(file_name: &str, mime_type: &str, data: Bytes) -> Self {
        Self {
            data,
            mime_type: mime_type.to_string(),
            source: ClipSource::Selected {
                file_name: file_name.to_string(),
            },
            created_at: Utc::now(),
        }
    }

    /// Raw container bytes
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// MIME type including codec parameters, e.g. `video/webm;codecs=vp8,opus`
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Clip origin
    pub fn source(&self) -> &ClipSource {
        &self.source
    }

    /// Creation time
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Whether the clip holds no data
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size in megabytes, rounded to two decimals
    pub fn size_mb(&self) -> f64 {
        bytes_to_mb(self.size() as u64)
    }

    /// MIME type without codec parameters
    pub fn container(&self) -> &str {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
    }

    /// File extension matching the container
    pub fn extension(&self) -> &'static str {
        match self.container() {
            "video/webm" | "audio/webm" => "webm",
            "video/mp4" | "audio/mp4" => "mp4",
            "video/quicktime" => "mov",
            _ => "bin",
        }
    }

    /// Filename used for multipart uploads and shared files
    pub fn upload_file_name(&self, timestamp_ms: i64) -> String {
        format!("video_{}.{}", timestamp_ms, self.extension())
    }

    /// Short description shown under the preview
    pub fn describe(&self) -> String {
        match &self.source {
            ClipSource::Recorded { .. } => format!("Size: {:.2} MB", self.size_mb()),
            ClipSource::Selected { file_name } => {
                format!("File: {} ({:.2} MB)", file_name, self.size_mb())
            }
        }
    }
}

/// Convert a byte count to megabytes rounded to two decimals
pub fn bytes_to_mb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 / 1024.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_from_chunks_concatenates_in_order() {
        let chunks = vec![
            Bytes::from_static(b"abc"),
            Bytes::from_static(b"de"),
            Bytes::from_static(b"f"),
        ];
        let clip = RecordedClip::from_chunks(&chunks, "video/webm;codecs=vp9,opus");

        assert_eq!(clip.size(), 6);
        assert_eq!(clip.data().as_ref(), b"abcdef");
        assert_eq!(clip.source(), &ClipSource::Recorded { chunk_count: 3 });
        assert_eq!(clip.container(), "video/webm");
        assert_eq!(clip.extension(), "webm");
    }

    #[test]
    fn test_upload_file_name() {
        let clip = RecordedClip::from_chunks(&[Bytes::from_static(b"x")], "video/mp4");
        assert_eq!(clip.upload_file_name(1700000000000), "video_1700000000000.mp4");

        let clip = RecordedClip::from_chunks(&[], "application/octet-stream");
        assert!(clip.is_empty());
        assert_eq!(clip.upload_file_name(1), "video_1.bin");
    }

    #[test]
    fn test_selected_clip_description() {
        let clip = RecordedClip::from_file(
            "holiday.webm",
            "video/webm",
            Bytes::from(vec![0u8; 3 * 1024 * 1024]),
        );
        assert_eq!(clip.size_mb(), 3.0);
        assert_eq!(clip.describe(), "File: holiday.webm (3.00 MB)");
    }

    #[test]
    fn test_bytes_to_mb_rounding() {
        assert_eq!(bytes_to_mb(0), 0.0);
        assert_eq!(bytes_to_mb(1024 * 1024), 1.0);
        assert_eq!(bytes_to_mb(1_572_864), 1.5);
    }
}
