use std::collections::HashMap;

use nanoid::nanoid;
use nebula_api::prelude::*;
use parking_lot::RwLock;

use super::*;

/// Keeps everything in process memory. Each call holds the lock for its
/// whole read-modify-write so increments can't be lost.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    // package name keyed to package document
    packages: HashMap<String, PackageModel>,
    // insertion order, oldest first
    reviews: Vec<ReviewModel>,
}

impl RegistryStore for MemoryStore {
    fn list_packages(&self) -> Result<Vec<PackageModel>, StoreError> {
        let mut packages: Vec<_> = self.tables.read().packages.values().cloned().collect();
        sort_by_popularity(&mut packages);
        Ok(packages)
    }

    fn package_by_name(&self, name: &str) -> Result<Option<PackageModel>, StoreError> {
        Ok(self.tables.read().packages.get(name).cloned())
    }

    fn insert_package(&self, package: NewPackage) -> Result<PackageModel, StoreError> {
        let mut tables = self.tables.write();
        if tables.packages.contains_key(&package.name) {
            return Err(StoreError::Conflict(package.name));
        }
        let package = package.into_model(nanoid!(), timestamp());
        tables
            .packages
            .insert(package.name.clone(), package.clone());
        Ok(package)
    }

    fn increment_downloads(&self, name: &str) -> Result<Option<PackageModel>, StoreError> {
        let mut tables = self.tables.write();
        Ok(tables.packages.get_mut(name).map(|package| {
            package.downloads += 1;
            package.clone()
        }))
    }

    fn package_count(&self) -> Result<u64, StoreError> {
        Ok(self.tables.read().packages.len() as u64)
    }

    fn total_downloads(&self) -> Result<u64, StoreError> {
        Ok(self
            .tables
            .read()
            .packages
            .values()
            .map(|package| package.downloads)
            .sum())
    }

    fn list_reviews(&self) -> Result<Vec<ReviewModel>, StoreError> {
        Ok(self.tables.read().reviews.iter().rev().cloned().collect())
    }

    fn insert_review(&self, review: NewReview) -> Result<ReviewModel, StoreError> {
        let review = review.into_model(nanoid!(), timestamp());
        self.tables.write().reviews.push(review.clone());
        Ok(review)
    }

    fn react_to_review(
        &self,
        id: &str,
        reaction: Reaction,
    ) -> Result<Option<ReviewModel>, StoreError> {
        let mut tables = self.tables.write();
        Ok(tables
            .reviews
            .iter_mut()
            .find(|review| review.id == id)
            .map(|review| {
                review.react(reaction);
                review.clone()
            }))
    }

    fn review_count(&self) -> Result<u64, StoreError> {
        Ok(self.tables.read().reviews.len() as u64)
    }

    fn average_rating(&self) -> Result<Option<f64>, StoreError> {
        Ok(mean_rating(
            self.tables.read().reviews.iter().map(|review| review.rating),
        ))
    }
}
