pub mod admin;
pub mod auth;
pub mod flash;
pub mod landing;
pub mod library;
pub mod responses;
pub mod router;
pub mod state;
pub mod storage;
pub mod templates;
pub mod uploads;

pub use responses::{ApiMessage, json_error};
pub use state::AppState;
