use std::path::Path as FsPath;

use anyhow::Result;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::{error, info};

use crate::{
    resources::ResourceStore,
    web::{
        ApiMessage, AppState, auth,
        flash::compose_named_flash,
        json_error,
        storage::stream_file,
        templates::{PageLayout, escape_html, render_page},
    },
};

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ResourceSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CategoryListing {
    pub name: String,
    pub resources: Vec<ResourceSummary>,
}

#[derive(Debug, Serialize)]
pub struct LibraryResponse {
    pub categories: Vec<CategoryListing>,
}

/// Every category with the files filed under it.
pub async fn load_library(store: &ResourceStore) -> Result<Vec<CategoryListing>> {
    let categories = store.list_categories().await?;
    let mut listings = Vec::with_capacity(categories.len());

    for name in categories {
        let resources = store
            .list_by_category(&name)
            .await?
            .into_iter()
            .map(|entry| ResourceSummary {
                id: entry.id,
                name: entry.name,
            })
            .collect();
        listings.push(CategoryListing { name, resources });
    }

    Ok(listings)
}

pub async fn render_library_page(state: &AppState, flash_html: &str) -> String {
    let body = match load_library(state.resources()).await {
        Ok(listings) if listings.is_empty() => compose_named_flash("info", "No Subjects available."),
        Ok(listings) => listings.iter().map(render_category).collect::<String>(),
        Err(err) => {
            error!(?err, "failed to load library listing");
            compose_named_flash("error", "Subjects could not be loaded. Please try again.")
        }
    };

    render_page(PageLayout {
        title: "Resource Portal",
        heading: "Study Resources",
        flash_html,
        body_html: &body,
        show_logout: true,
    })
}

fn render_category(listing: &CategoryListing) -> String {
    let content = if listing.resources.is_empty() {
        "<p>No files available in this category.</p>".to_string()
    } else {
        let rows = listing
            .resources
            .iter()
            .map(|resource| {
                format!(
                    r#"<tr><td>{name}</td><td class="action"><a class="download-link" href="/download/{id}">Download</a></td></tr>"#,
                    name = escape_html(&resource.name),
                    id = resource.id,
                )
            })
            .collect::<String>();
        format!("<table><tbody>{rows}</tbody></table>")
    };

    format!(
        r#"        <details>
            <summary>Subject : {name}</summary>
            {content}
        </details>
"#,
        name = escape_html(&listing.name),
    )
}

pub async fn list_library(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<LibraryResponse>, (StatusCode, Json<ApiMessage>)> {
    auth::require_signed_in(&state, &jar).await?;

    let categories = load_library(state.resources()).await.map_err(|err| {
        error!(?err, "failed to load library listing");
        json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Subjects could not be loaded.",
        )
    })?;

    Ok(Json(LibraryResponse { categories }))
}

/// Stream a stored file under its original name.
pub async fn download_resource(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, (StatusCode, Json<ApiMessage>)> {
    let current = auth::require_signed_in(&state, &jar).await?;

    let resource = state
        .resources()
        .find(id)
        .await
        .map_err(|err| {
            error!(?err, id, "failed to load resource for download");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load the file.")
        })?
        .ok_or_else(|| json_error(StatusCode::NOT_FOUND, "No such file."))?;

    let response = stream_file(FsPath::new(&resource.path), &resource.name).await?;
    info!(
        id = resource.id,
        name = %resource.name,
        category = %resource.category,
        role = current.session.role().map(|role| role.as_str()),
        "resource downloaded"
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_renders_download_links() {
        let html = render_category(&CategoryListing {
            name: "DBMS".into(),
            resources: vec![ResourceSummary {
                id: 7,
                name: "unit1.pdf".into(),
            }],
        });
        assert!(html.contains("Subject : DBMS"));
        assert!(html.contains(r#"href="/download/7""#));
    }

    #[test]
    fn empty_category_renders_notice() {
        let html = render_category(&CategoryListing {
            name: "OS".into(),
            resources: Vec::new(),
        });
        assert!(html.contains("No files available in this category."));
    }
}
