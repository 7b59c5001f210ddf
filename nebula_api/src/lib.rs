pub mod db;
pub mod http;
pub mod prelude;

pub use http::ApiError;
pub use http::NebulaApi;

#[cfg(debug_assertions)]
pub const REGISTRY_URL: &'static str = "http://127.0.0.1:3001";
#[cfg(not(debug_assertions))]
pub const REGISTRY_URL: &'static str = "https://trica.k2lang.org/api";

/// Version of the Trica toolchain advertised by the registry.
pub const TRICA_VERSION: &'static str = "1.1.7";

pub fn timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}
