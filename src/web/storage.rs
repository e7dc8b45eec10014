use std::{io::ErrorKind, path::Path};

use axum::Json;
use axum::{
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::web::{ApiMessage, json_error};

/// Content type for a stored document, judged by its extension.
pub fn content_type_for(filename: &str) -> mime::Mime {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let guessed = match extension.as_str() {
        "pdf" => Some(mime::APPLICATION_PDF),
        "txt" => Some(mime::TEXT_PLAIN_UTF_8),
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            .parse()
            .ok(),
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            .parse()
            .ok(),
        _ => None,
    };

    guessed.unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

/// `Content-Disposition` value carrying the original name, with an ASCII fallback.
pub fn attachment_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    let mut encoded = String::with_capacity(filename.len());
    for byte in filename.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

/// Stream a file with an attachment disposition under `filename`.
pub async fn stream_file(
    path: &Path,
    filename: &str,
) -> Result<Response, (StatusCode, Json<ApiMessage>)> {
    let bytes = tokio::fs::read(path).await.map_err(|err| {
        if err.kind() == ErrorKind::NotFound {
            error!(file = %path.display(), "stored file is missing");
            json_error(StatusCode::NOT_FOUND, "The file is no longer available.")
        } else {
            error!(?err, file = %path.display(), "failed to read download file");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read the file.")
        }
    })?;

    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(content_type_for(filename).as_ref())
        .unwrap_or(HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_TYPE, content_type);

    let disposition = HeaderValue::from_str(&attachment_disposition(filename)).map_err(|_| {
        json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Invalid download header.",
        )
    })?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok((headers, bytes).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("notes.PDF"), mime::APPLICATION_PDF);
        assert_eq!(content_type_for("readme.txt"), mime::TEXT_PLAIN_UTF_8);
        assert_eq!(
            content_type_for("slides.pptx").essence_str(),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        );
        assert_eq!(content_type_for("archive"), mime::APPLICATION_OCTET_STREAM);
    }

    #[test]
    fn disposition_escapes_quotes_and_unicode() {
        let value = attachment_disposition("unit \"1\" é.pdf");
        assert_eq!(
            value,
            "attachment; filename=\"unit _1_ _.pdf\"; filename*=UTF-8''unit%20%221%22%20%C3%A9.pdf"
        );
        assert!(HeaderValue::from_str(&value).is_ok());
    }
}
