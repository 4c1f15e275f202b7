pub mod json_post_store;

pub use json_post_store::JsonFilePostStore;
