use std::collections::BTreeSet;

use axum::{
    extract::{Form, Multipart, State},
    response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::web::{
    AppState,
    templates::encode_query_value,
    uploads::{read_upload_form, validate_upload},
};

use super::auth::require_admin_session;

#[derive(Deserialize)]
pub(crate) struct DeleteFileForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct DeleteCategoryForm {
    #[serde(default)]
    category: String,
}

fn back_to_admin(flash: &str, category: Option<&str>) -> Redirect {
    match category.filter(|value| !value.is_empty()) {
        Some(category) => Redirect::to(&format!(
            "/?{flash}&category={}",
            encode_query_value(category)
        )),
        None => Redirect::to(&format!("/?{flash}")),
    }
}

/// Write the uploaded bytes to the vault, then record the row.
///
/// A failed insert leaves the written file in place.
pub async fn upload_resource(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Redirect, Redirect> {
    let _admin = require_admin_session(&state, &jar).await?;

    let submission = match read_upload_form(multipart).await {
        Ok(submission) => submission,
        Err(err) => {
            warn!(%err, "failed to read upload form");
            return Ok(back_to_admin(&format!("error={}", err.code()), None));
        }
    };

    let upload = match validate_upload(submission, &state.config().allowed_extensions) {
        Ok(upload) => upload,
        Err(err) => {
            warn!(%err, "upload rejected");
            return Ok(back_to_admin(&format!("error={}", err.code()), None));
        }
    };

    let name = upload.file.original_name.as_str();
    let category = upload.category.as_str();

    let stored_path = match state.vault().store(&upload.file.bytes, name).await {
        Ok(path) => path,
        Err(err) => {
            error!(?err, name, "failed to store uploaded file");
            return Ok(back_to_admin("error=storage", None));
        }
    };
    let path = stored_path.to_string_lossy();

    if let Err(err) = state.resources().insert(name, category, &path).await {
        error!(?err, name, file = %path, "failed to record upload; stored file left in place");
        return Ok(back_to_admin("error=storage", None));
    }

    info!(
        name,
        category,
        file = %path,
        size = upload.file.bytes.len(),
        "resource uploaded"
    );
    Ok(back_to_admin(
        &format!("status=uploaded&name={}", encode_query_value(name)),
        Some(category),
    ))
}

/// Remove every row named `name` (in any category), then the files behind them.
pub async fn delete_file(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<DeleteFileForm>,
) -> Result<Redirect, Redirect> {
    let _admin = require_admin_session(&state, &jar).await?;
    let category = form.category.as_deref();

    if form.name.is_empty() {
        return Ok(back_to_admin("error=missing_name", category));
    }
    let name = form.name.as_str();

    let paths: BTreeSet<String> = match state.resources().paths_by_name(name).await {
        Ok(paths) => paths.into_iter().collect(),
        Err(err) => {
            error!(?err, name, "failed to look up files before delete");
            return Ok(back_to_admin("error=storage", category));
        }
    };

    let rows = match state.resources().delete_by_name(name).await {
        Ok(rows) => rows,
        Err(err) => {
            error!(?err, name, "failed to delete resource rows");
            return Ok(back_to_admin("error=storage", category));
        }
    };

    let mut files_removed = 0_u64;
    for path in &paths {
        match state.vault().remove(path).await {
            Ok(true) => files_removed += 1,
            Ok(false) => {}
            Err(err) => {
                error!(?err, name, file = %path, "failed to remove stored file");
                return Ok(back_to_admin("error=storage", category));
            }
        }
    }

    info!(name, rows, files_removed, "resource deleted");
    Ok(back_to_admin(
        &format!("status=file_deleted&name={}", encode_query_value(name)),
        category,
    ))
}

/// Remove every file of a category from the vault, then its rows.
pub async fn delete_category(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<DeleteCategoryForm>,
) -> Result<Redirect, Redirect> {
    let _admin = require_admin_session(&state, &jar).await?;

    if form.category.is_empty() {
        return Ok(back_to_admin("error=missing_category", None));
    }
    let category = form.category.as_str();

    let resources = match state.resources().list_by_category(category).await {
        Ok(resources) => resources,
        Err(err) => {
            error!(?err, category, "failed to list category before delete");
            return Ok(back_to_admin("error=storage", Some(category)));
        }
    };

    let mut files_removed = 0_u64;
    for resource in &resources {
        match state.vault().remove(&resource.path).await {
            Ok(true) => files_removed += 1,
            Ok(false) => {}
            Err(err) => {
                error!(?err, category, file = %resource.path, "failed to remove stored file");
                return Ok(back_to_admin("error=storage", Some(category)));
            }
        }
    }

    let rows = match state.resources().delete_by_category(category).await {
        Ok(rows) => rows,
        Err(err) => {
            error!(?err, category, "failed to delete category rows");
            return Ok(back_to_admin("error=storage", Some(category)));
        }
    };

    info!(category, rows, files_removed, "category deleted");
    Ok(back_to_admin(
        &format!("status=category_deleted&name={}", encode_query_value(category)),
        None,
    ))
}
