use crate::web::templates::escape_html;

/// Query parameters a redirect can carry back to the landing page.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlashContext<'a> {
    pub status: Option<&'a str>,
    pub error: Option<&'a str>,
    /// File or subject the status refers to.
    pub name: Option<&'a str>,
    pub category: Option<&'a str>,
}

/// Compose a flash message HTML snippet for known status or error codes.
pub fn compose_flash_message(context: &FlashContext<'_>, allowed_extensions: &[String]) -> String {
    if let Some(message) = context.status.and_then(|status| status_message(status, context)) {
        return compose_named_flash("success", &message);
    }

    if let Some(error) = context.error {
        let message = match error {
            "missing_credentials" => "Please enter both a username and a password.".to_string(),
            "invalid_credentials" => "Invalid credentials!".to_string(),
            "invalid_password" => "Invalid password!".to_string(),
            "not_authorized" => "That action requires the administrator.".to_string(),
            "upload_missing_fields" => "Please provide both a file and a subject.".to_string(),
            "upload_unsupported_type" => unsupported_type_message(allowed_extensions),
            "upload_too_many_files" => "Upload one file at a time.".to_string(),
            "upload_malformed" => "The upload could not be read. Please try again.".to_string(),
            "missing_name" => "Choose a file to delete.".to_string(),
            "missing_category" => "Choose a subject first.".to_string(),
            "storage" => {
                "An error occurred while updating the library. Please try again.".to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        };

        return compose_named_flash("error", &message);
    }

    String::new()
}

fn status_message(status: &str, context: &FlashContext<'_>) -> Option<String> {
    let name = context.name.filter(|value| !value.is_empty());
    let category = context.category.filter(|value| !value.is_empty());

    let message = match (status, name, category) {
        ("logged_out", _, _) => "You have been logged out.".to_string(),
        ("uploaded", Some(name), Some(category)) => {
            format!("File '{name}' uploaded successfully under '{category}'.")
        }
        ("uploaded", _, _) => "File uploaded successfully.".to_string(),
        ("file_deleted", Some(name), _) => format!("File '{name}' deleted successfully."),
        ("file_deleted", None, _) => "File deleted successfully.".to_string(),
        ("category_deleted", Some(name), _) => {
            format!("Subject '{name}' and all its files deleted successfully.")
        }
        ("category_deleted", None, _) => {
            "Subject and all its files deleted successfully.".to_string()
        }
        _ => return None,
    };
    Some(message)
}

fn unsupported_type_message(allowed_extensions: &[String]) -> String {
    match allowed_extensions {
        [] => "That file type cannot be uploaded.".to_string(),
        [only] => format!("Only {} files can be uploaded.", only.to_ascii_uppercase()),
        [rest @ .., last] => {
            let rest = rest
                .iter()
                .map(|ext| ext.to_ascii_uppercase())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "Only {rest} and {} files can be uploaded.",
                last.to_ascii_uppercase()
            )
        }
    }
}

/// Flash snippet with escaped text; `kind` picks the style class.
pub fn compose_named_flash(kind: &str, text: &str) -> String {
    format!(
        r#"<div class="flash {kind}">{text}</div>"#,
        kind = kind,
        text = escape_html(text),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        ["pdf", "docx", "pptx", "txt"].map(String::from).to_vec()
    }

    fn flash(status: Option<&str>, error: Option<&str>) -> String {
        compose_flash_message(
            &FlashContext {
                status,
                error,
                ..FlashContext::default()
            },
            &defaults(),
        )
    }

    #[test]
    fn status_wins_over_unknown_error() {
        let html = flash(Some("uploaded"), Some("storage"));
        assert!(html.contains("flash success"));
    }

    #[test]
    fn unknown_status_falls_through_to_error() {
        let html = flash(Some("nope"), Some("invalid_password"));
        assert!(html.contains("Invalid password!"));
    }

    #[test]
    fn unknown_error_gets_generic_message() {
        let html = flash(None, Some("<script>"));
        assert!(html.contains("Something went wrong"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn nothing_to_say_is_empty() {
        assert!(flash(None, None).is_empty());
    }

    #[test]
    fn upload_status_names_file_and_subject() {
        let html = compose_flash_message(
            &FlashContext {
                status: Some("uploaded"),
                name: Some("unit1<b>.pdf"),
                category: Some("DBMS"),
                ..FlashContext::default()
            },
            &defaults(),
        );
        assert_eq!(
            html,
            r#"<div class="flash success">File &#39;unit1&lt;b&gt;.pdf&#39; uploaded successfully under &#39;DBMS&#39;.</div>"#
        );
    }

    #[test]
    fn delete_statuses_name_the_item() {
        let file = compose_flash_message(
            &FlashContext {
                status: Some("file_deleted"),
                name: Some("notes.txt"),
                ..FlashContext::default()
            },
            &defaults(),
        );
        assert!(file.contains("File &#39;notes.txt&#39; deleted successfully."));

        let subject = compose_flash_message(
            &FlashContext {
                status: Some("category_deleted"),
                name: Some("OS"),
                ..FlashContext::default()
            },
            &defaults(),
        );
        assert!(subject.contains("Subject &#39;OS&#39; and all its files deleted successfully."));
    }

    #[test]
    fn unsupported_type_lists_configured_extensions() {
        let html = flash(None, Some("upload_unsupported_type"));
        assert!(html.contains("Only PDF, DOCX, PPTX and TXT files can be uploaded."));

        let custom = compose_flash_message(
            &FlashContext {
                error: Some("upload_unsupported_type"),
                ..FlashContext::default()
            },
            &["md".to_string(), "csv".to_string()],
        );
        assert!(custom.contains("Only MD and CSV files can be uploaded."));

        let single = unsupported_type_message(&["pdf".to_string()]);
        assert_eq!(single, "Only PDF files can be uploaded.");
        assert_eq!(unsupported_type_message(&[]), "That file type cannot be uploaded.");
    }

    #[test]
    fn named_flash_escapes_text() {
        assert_eq!(
            compose_named_flash("success", "File 'a<b>.pdf' uploaded"),
            r#"<div class="flash success">File &#39;a&lt;b&gt;.pdf&#39; uploaded</div>"#
        );
    }
}
