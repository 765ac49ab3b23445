//! News source scrapers.
//!
//! A scraper works in two phases over markup fetched elsewhere:
//!
//! 1. **Discovery**: turn the homepage into an ordered list of article URLs
//! 2. **Extraction**: turn one article page into raw
//!    [`ArticleFields`](crate::models::ArticleFields)
//!
//! # Supported Sources
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | BBC News | [`bbcnews`] | HTML scraping of the homepage and article pages |

pub mod bbcnews;
