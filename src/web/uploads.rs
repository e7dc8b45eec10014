use std::{fmt, path::Path};

use axum::extract::Multipart;

pub const FILE_FIELD: &str = "file";
pub const CATEGORY_FIELD: &str = "category";

/// Result type used by the upload helpers.
pub type UploadResult<T> = Result<T, UploadError>;

/// Error returned when reading or validating an upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The form lacked a file, a category, or both.
    MissingFields,
    UnsupportedType { extension: String },
    TooManyFiles,
    Malformed(String),
}

impl UploadError {
    /// Flash code carried back to the admin page.
    pub fn code(&self) -> &'static str {
        match self {
            UploadError::MissingFields => "upload_missing_fields",
            UploadError::UnsupportedType { .. } => "upload_unsupported_type",
            UploadError::TooManyFiles => "upload_too_many_files",
            UploadError::Malformed(_) => "upload_malformed",
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::MissingFields => f.write_str("a file and a subject are both required"),
            UploadError::UnsupportedType { extension } if extension.is_empty() => {
                f.write_str("files without an extension are not accepted")
            }
            UploadError::UnsupportedType { extension } => {
                write!(f, "`.{extension}` files are not accepted")
            }
            UploadError::TooManyFiles => f.write_str("only one file can be uploaded at a time"),
            UploadError::Malformed(detail) => write!(f, "could not read upload form: {detail}"),
        }
    }
}

impl std::error::Error for UploadError {}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// Raw contents of the admin upload form, before validation.
#[derive(Debug, Default)]
pub struct UploadSubmission {
    pub file: Option<UploadedFile>,
    pub category: Option<String>,
}

/// A submission that passed validation and may be written to the vault.
#[derive(Debug)]
pub struct ValidUpload {
    pub file: UploadedFile,
    pub category: String,
}

/// Collect the file and category fields from a multipart body.
///
/// A file input left empty by the browser arrives with a blank file name and
/// is treated as absent.
pub async fn read_upload_form(mut multipart: Multipart) -> UploadResult<UploadSubmission> {
    let mut submission = UploadSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| UploadError::Malformed(err.to_string()))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            FILE_FIELD => {
                let original_name = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| UploadError::Malformed(err.to_string()))?;

                if original_name.is_empty() {
                    continue;
                }
                if submission.file.is_some() {
                    return Err(UploadError::TooManyFiles);
                }
                submission.file = Some(UploadedFile {
                    original_name,
                    bytes: bytes.to_vec(),
                });
            }
            CATEGORY_FIELD => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| UploadError::Malformed(err.to_string()))?;
                submission.category = Some(value);
            }
            _ => {}
        }
    }

    Ok(submission)
}

/// Check presence of both fields and the file extension against `allowed_extensions`.
///
/// An empty allow-list accepts every extension.
pub fn validate_upload(
    submission: UploadSubmission,
    allowed_extensions: &[String],
) -> UploadResult<ValidUpload> {
    let category = submission
        .category
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    let (Some(file), Some(category)) = (submission.file, category) else {
        return Err(UploadError::MissingFields);
    };

    let extension = extension_of(&file.original_name);
    if !allowed_extensions.is_empty() && !allowed_extensions.contains(&extension) {
        return Err(UploadError::UnsupportedType { extension });
    }

    Ok(ValidUpload { file, category })
}

fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}
