use tracing::error;

use crate::{
    resources::ResourceEntry,
    web::{
        AppState,
        flash::compose_named_flash,
        templates::{PageLayout, escape_html, render_page},
    },
};

/// Placeholder option shown before a subject is chosen.
const SELECT_PLACEHOLDER: &str = "Select";

pub async fn render_admin_page(
    state: &AppState,
    flash_html: &str,
    selected_category: Option<&str>,
) -> String {
    let upload_section = render_upload_section(&state.config().allowed_extensions);

    let manage_section = match state.resources().list_categories().await {
        Ok(categories) => {
            let selected = selected_category
                .filter(|value| *value != SELECT_PLACEHOLDER)
                .filter(|value| categories.iter().any(|category| category.as_str() == *value));
            render_manage_section(state, &categories, selected).await
        }
        Err(err) => {
            error!(?err, "failed to load categories for admin page");
            compose_named_flash("error", "Subjects could not be loaded. Please try again.")
        }
    };

    let body = format!(
        r#"        <section class="panel">
            <h2>Upload Resources</h2>
{upload_section}
        </section>
        <section class="panel">
            <h2>Delete Files</h2>
{manage_section}
        </section>"#
    );

    render_page(PageLayout {
        title: "Resource Portal · Admin",
        heading: "Admin Dashboard",
        flash_html,
        body_html: &body,
        show_logout: true,
    })
}

fn render_upload_section(allowed_extensions: &[String]) -> String {
    let accept = allowed_extensions
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",");
    let accept_attr = if accept.is_empty() {
        String::new()
    } else {
        format!(r#" accept="{}""#, escape_html(&accept))
    };

    format!(
        r#"            <form method="post" action="/admin/upload" enctype="multipart/form-data">
                <label for="file">Choose a file</label>
                <input id="file" type="file" name="file"{accept_attr}>
                <label for="category">Enter subject</label>
                <input id="category" type="text" name="category">
                <div class="actions"><button type="submit">Upload</button></div>
            </form>"#
    )
}

async fn render_manage_section(
    state: &AppState,
    categories: &[String],
    selected: Option<&str>,
) -> String {
    if categories.is_empty() {
        return compose_named_flash("info", "No categories available to delete.");
    }

    let mut options = format!(r#"<option value="">{SELECT_PLACEHOLDER}</option>"#);
    for category in categories {
        options.push_str(&format!(
            "<option value=\"{value}\"{marker}>{label}</option>",
            value = escape_html(category),
            label = escape_html(category),
            marker = if Some(category.as_str()) == selected {
                " selected"
            } else {
                ""
            },
        ));
    }

    let selector = format!(
        r#"            <form method="get" action="/">
                <label for="manage-category">Select a subject to manage</label>
                <select id="manage-category" name="category">{options}</select>
                <div class="actions"><button type="submit">Manage</button></div>
            </form>"#
    );

    let Some(category) = selected else {
        return selector;
    };

    let listing = match state.resources().list_by_category(category).await {
        Ok(resources) => render_category_files(category, &resources),
        Err(err) => {
            error!(?err, category, "failed to load resources for admin page");
            compose_named_flash("error", "Files could not be loaded. Please try again.")
        }
    };

    let escaped = escape_html(category);
    format!(
        r#"{selector}
            <h3>Files in {escaped}</h3>
{listing}
            <form method="post" action="/admin/delete-category">
                <input type="hidden" name="category" value="{escaped}">
                <div class="actions"><button type="submit" class="danger">Delete all files of '{escaped}'</button></div>
            </form>"#
    )
}

fn render_category_files(category: &str, resources: &[ResourceEntry]) -> String {
    if resources.is_empty() {
        return compose_named_flash("info", &format!("No resources found in '{category}'."));
    }

    let rows = resources
        .iter()
        .map(|resource| {
            format!(
                r#"<tr><td>{name}</td><td class="action"><form method="post" action="/admin/delete"><input type="hidden" name="name" value="{name}"><input type="hidden" name="category" value="{category}"><button type="submit" class="danger">Delete</button></form></td></tr>"#,
                name = escape_html(&resource.name),
                category = escape_html(category),
            )
        })
        .collect::<String>();

    format!(r#"            <table><tbody>{rows}</tbody></table>"#)
}
