pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use router::{SERVICE_NAME, build_router};
