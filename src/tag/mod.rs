//! Core tagging data structures

mod config;
mod declaration;
mod engine;
mod entity;
mod list;
mod record;
mod tag;
mod tagging;

pub use config::TagConfig;
pub use declaration::{ContextDecl, TaggableType};
pub use engine::{FolksoEngine, FolksoError, FolksoResult, TagOptions};
pub use entity::EntityRef;
pub use list::{ParseError, TagList};
pub use record::{SaveReport, SavedScope, TaggedRecord};
pub use tag::{Tag, TagId};
pub use tagging::{Tagging, TaggingId};
