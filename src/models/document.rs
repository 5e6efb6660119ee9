use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::Bytes;
use serde::Serialize;

/// An uploaded file that lives only for the current process.
///
/// Never written to the candidate snapshot; API responses expose its metadata
/// only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionFile {
    pub file_name: String,
    pub content_type: String,
    #[serde(skip)]
    pub data: Bytes,
    pub size: usize,
}

impl SessionFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        let size = data.len();
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
            size,
        }
    }

    /// Renders the file as `data:<mime>;base64,<payload>`.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, BASE64.encode(&self.data))
    }

    pub fn base64_payload(&self) -> String {
        BASE64.encode(&self.data)
    }

    pub fn is_text(&self) -> bool {
        self.content_type.starts_with("text/")
    }
}
