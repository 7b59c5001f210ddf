use nebula_api::prelude::*;

use crate::error::NebulaError;
use crate::registry::FEATURES;
use crate::registry::Registry;
use crate::store::RegistryStore;
use crate::store::StoreError;

impl Registry {
    /// Each aggregate is queried on its own. A failing one is reported as
    /// null and named in `unavailable`; only a total failure is an error.
    pub fn stats(&self) -> Result<StatsResponse, NebulaError> {
        let mut unavailable = vec![];
        let packages = self.aggregate("packages", &mut unavailable, |s| s.package_count());
        let reviews = self.aggregate("reviews", &mut unavailable, |s| s.review_count());
        let total_downloads =
            self.aggregate("totalDownloads", &mut unavailable, |s| s.total_downloads());
        let average_rating = self
            .aggregate("averageRating", &mut unavailable, |s| s.average_rating())
            .map(|average| {
                let average = average.unwrap_or(0.0);
                (average * 10.0).round() / 10.0
            });

        if unavailable.len() == 4 {
            return Err(NebulaError::store_unavailable());
        }
        let message = if unavailable.is_empty() {
            "Statistics fetched successfully".to_string()
        } else {
            format!("Statistics partially available, missing: {}", unavailable.join(", "))
        };
        Ok(StatsResponse {
            success: true,
            stats: RegistryStats {
                packages,
                reviews,
                total_downloads,
                average_rating,
                version: TRICA_VERSION.to_string(),
                features: FEATURES.iter().map(|f| f.to_string()).collect(),
                unavailable,
            },
            message,
        })
    }

    fn aggregate<T>(
        &self,
        name: &str,
        unavailable: &mut Vec<String>,
        query: impl FnOnce(&dyn RegistryStore) -> Result<T, StoreError>,
    ) -> Option<T> {
        match query(self.store.as_ref()) {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("stats aggregate {name} failed: {e}");
                unavailable.push(name.to_string());
                None
            }
        }
    }
}
