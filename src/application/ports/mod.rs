pub mod cache;
pub mod post_store;

pub use cache::{CachedValue, FeedCache};
pub use post_store::PostStore;
