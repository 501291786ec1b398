pub mod format;
pub mod models;
pub mod render;
pub mod templates;
