//! ShareLinkManager: public, slug-addressed views of full reports.

pub mod manager;
pub mod slug;

pub use manager::ShareLinkManager;
pub use slug::{RandomSlugGenerator, SlugGenerator};
