mod auth;
mod dashboard;
mod resources;

pub use dashboard::render_admin_page;
pub use resources::{delete_category, delete_file, upload_resource};
