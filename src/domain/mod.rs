pub mod entities;
pub mod value_objects;

pub use entities::{Comment, FeedPage, Post};
pub use value_objects::FeedCursor;
