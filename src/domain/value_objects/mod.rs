pub mod feed_cursor;

pub use feed_cursor::FeedCursor;
