mod duplicates;
mod engine;

pub use duplicates::{
    canonical, duplicate_links, duplicate_links_with, exact, DuplicateGroup, LinkNormalizer,
};
pub use engine::reconcile;
