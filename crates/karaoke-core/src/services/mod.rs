pub mod catalog_service;
pub mod prompts;

pub use catalog_service::{CatalogService, Lyrics, LyricsOrigin};
