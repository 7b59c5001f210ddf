mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use nebula_api::prelude::*;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// A unique key already exists. Carries the key.
    #[error("unique constraint violated for {0}")]
    Conflict(String),
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// A package that passed validation and is ready to be inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPackage {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub quantum_level: u8,
    pub code: String,
}

impl NewPackage {
    /// Materialize the stored document. `downloads` always starts at 0.
    pub fn into_model(self, id: String, created_at: u64) -> PackageModel {
        PackageModel {
            id,
            name: self.name,
            version: self.version,
            description: self.description,
            author: self.author,
            quantum_level: self.quantum_level,
            code: self.code,
            downloads: 0,
            created_at,
        }
    }
}

/// A review that passed validation and is ready to be inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewReview {
    pub name: String,
    pub rating: u8,
    pub title: String,
    pub comment: String,
    pub mind_destroyed: bool,
}

impl NewReview {
    pub fn into_model(self, id: String, created_at: u64) -> ReviewModel {
        ReviewModel {
            id,
            name: self.name,
            rating: self.rating,
            title: self.title,
            comment: self.comment,
            mind_destroyed: self.mind_destroyed,
            likes: 0,
            dislikes: 0,
            created_at,
        }
    }
}

/// Persistence for packages and reviews.
///
/// Every mutating call must be atomic at the store level. Counters are
/// incremented inside the store, never read by the caller and written back.
pub trait RegistryStore: Send + Sync {
    /// All packages, most downloaded first.
    fn list_packages(&self) -> Result<Vec<PackageModel>, StoreError>;

    /// Exact, case sensitive lookup.
    fn package_by_name(&self, name: &str) -> Result<Option<PackageModel>, StoreError>;

    /// Returns `StoreError::Conflict` if the name is taken. Never overwrites.
    fn insert_package(&self, package: NewPackage) -> Result<PackageModel, StoreError>;

    /// Atomically add one to `downloads`. `None` if no package has this name.
    fn increment_downloads(&self, name: &str) -> Result<Option<PackageModel>, StoreError>;

    fn package_count(&self) -> Result<u64, StoreError>;

    fn total_downloads(&self) -> Result<u64, StoreError>;

    /// All reviews, newest first.
    fn list_reviews(&self) -> Result<Vec<ReviewModel>, StoreError>;

    fn insert_review(&self, review: NewReview) -> Result<ReviewModel, StoreError>;

    /// Atomically bump the counter for `reaction`. `None` for an unknown id.
    fn react_to_review(
        &self,
        id: &str,
        reaction: Reaction,
    ) -> Result<Option<ReviewModel>, StoreError>;

    fn review_count(&self) -> Result<u64, StoreError>;

    /// Mean rating across all reviews, `None` when there are no reviews.
    fn average_rating(&self) -> Result<Option<f64>, StoreError>;

    /// Case insensitive substring match on name or description.
    fn search_packages(&self, query: &str) -> Result<Vec<PackageModel>, StoreError> {
        let query = query.to_lowercase();
        Ok(self
            .list_packages()?
            .into_iter()
            .filter(|package| {
                package.name.to_lowercase().contains(&query)
                    || package.description.to_lowercase().contains(&query)
            })
            .collect())
    }
}

/// Most downloaded first, ties broken by name so listings are stable.
pub fn sort_by_popularity(packages: &mut [PackageModel]) {
    packages.sort_by(|a, b| {
        b.downloads
            .cmp(&a.downloads)
            .then_with(|| a.name.cmp(&b.name))
    });
}

pub fn mean_rating<I: IntoIterator<Item = u8>>(ratings: I) -> Option<f64> {
    let (sum, count) = ratings
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), rating| {
            (sum + rating as u64, count + 1)
        });
    if count == 0 {
        None
    } else {
        Some(sum as f64 / count as f64)
    }
}
