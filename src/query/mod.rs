//! Read-only statistical queries over taggings
//!
//! Usage counts, related-record rankings, and the pure bucket mapping used
//! for cloud rendering. Queries are builders executed by the store; an
//! unknown context simply yields an empty result.

mod cloud;
mod counts;
mod related;
mod types;

pub use cloud::tag_cloud;
pub use counts::{CountOrder, TagCountQuery};
pub use related::RelatedQuery;
pub use types::{RelatedRecord, TagCount};
