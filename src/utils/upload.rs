use std::path::Path;

use crate::error::{Error, Result};
use crate::models::document::SessionFile;

pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_AUDIO_BYTES: usize = 20 * 1024 * 1024;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TEXT_MIME: &str = "text/plain";

const RESUME_TYPES: [&str; 3] = [PDF_MIME, DOCX_MIME, TEXT_MIME];
const AUDIO_TYPES: [&str; 5] = ["audio/mpeg", "audio/wav", "audio/ogg", "audio/mp4", "audio/webm"];

/// Picks a media type for an upload: the declared one when it is specific,
/// otherwise a guess from the file extension.
pub fn resolve_content_type(file_name: &str, declared: Option<&str>) -> String {
    let declared = declared
        .map(|d| d.split(';').next().unwrap_or(d).trim().to_ascii_lowercase())
        .filter(|d| !d.is_empty() && d != "application/octet-stream");
    if let Some(content_type) = declared {
        return content_type;
    }

    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => PDF_MIME,
        "docx" => DOCX_MIME,
        "txt" => TEXT_MIME,
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" | "mp4" => "audio/mp4",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
    .to_string()
}

pub fn check_resume(file: &SessionFile) -> Result<()> {
    if file.data.is_empty() {
        return Err(Error::BadRequest("Resume file is required.".into()));
    }
    if file.size > MAX_RESUME_BYTES {
        return Err(Error::BadRequest("Max file size is 5MB.".into()));
    }
    if !RESUME_TYPES.contains(&file.content_type.as_str()) {
        return Err(Error::BadRequest(".pdf, .docx, .txt files are accepted.".into()));
    }
    if file.content_type == PDF_MIME && !file.data.starts_with(b"%PDF") {
        return Err(Error::BadRequest("Invalid PDF file content".into()));
    }
    // DOCX is a zip container.
    if file.content_type == DOCX_MIME && !file.data.starts_with(b"PK\x03\x04") {
        return Err(Error::BadRequest("Invalid DOCX file content".into()));
    }
    Ok(())
}

pub fn check_audio(file: &SessionFile) -> Result<()> {
    if file.data.is_empty() {
        return Err(Error::BadRequest("Audio file is required.".into()));
    }
    if file.size > MAX_AUDIO_BYTES {
        return Err(Error::BadRequest("Max audio file size is 20MB.".into()));
    }
    if !AUDIO_TYPES.contains(&file.content_type.as_str()) {
        return Err(Error::BadRequest(
            "MP3, WAV, OGG, MP4 (audio), WebM (audio) files are accepted.".into(),
        ));
    }
    Ok(())
}
