mod api;
mod error;
pub mod types;

pub use api::NebulaApi;
pub use error::ApiError;
