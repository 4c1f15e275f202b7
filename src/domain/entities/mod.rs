pub mod comment;
pub mod feed_page;
pub mod post;

pub use comment::Comment;
pub use feed_page::FeedPage;
pub use post::Post;
