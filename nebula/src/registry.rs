use std::sync::Arc;

use chrono::SecondsFormat;
use chrono::Utc;
use nebula_api::prelude::*;

use crate::store::RegistryStore;

pub const FEATURES: [&str; 6] = [
    "Bytecode VM",
    "TPKG Package Manager",
    "Quantum Computing",
    "Time Travel",
    "Neural Networks",
    "Mind Destruction",
];

/// Request handling independent of any transport. Every operation is a
/// single call against the injected store; nothing is kept between calls.
///
/// Package operations live in `packages.rs`, review operations in
/// `reviews.rs` and aggregation in `stats.rs`.
#[derive(Clone)]
pub struct Registry {
    pub(crate) store: Arc<dyn RegistryStore>,
}

impl Registry {
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }

    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            success: true,
            status: "online".to_string(),
            message: "Trica registry is online".to_string(),
            version: TRICA_VERSION.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            features: FEATURES.iter().map(|f| f.to_string()).collect(),
        }
    }
}
