pub use crate::ApiError;
pub use crate::NebulaApi;
pub use crate::TRICA_VERSION;
pub use crate::db::*;
pub use crate::http::types::*;
pub use crate::timestamp;
