use serde::{Deserialize, Serialize};

/// Raw file as handed over by the picker or a drop
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl CandidateFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Validated in-memory image
///
/// Only constructed by ingestion; fields are read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    mime_type: String,
    file_name: String,
    size_bytes: u64,
}

impl ImagePayload {
    pub(crate) fn new(bytes: Vec<u8>, mime_type: String, file_name: String) -> Self {
        let size_bytes = bytes.len() as u64;
        Self {
            bytes,
            mime_type,
            file_name,
            size_bytes,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

/// Display metadata for the preview step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImagePreview {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub data_url: String,
}
