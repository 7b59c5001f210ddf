use std::path::Path;
use std::sync::Arc;

use nanoid::nanoid;
use nebula_api::prelude::*;
use redb::Database;
use redb::ReadableTable;
use redb::ReadableTableMetadata;

use super::*;

macro_rules! impl_error_from {
    ($error_type:ty) => {
        impl From<$error_type> for StoreError {
            fn from(value: $error_type) -> Self {
                StoreError::Backend(value.to_string())
            }
        }
    };
}

impl_error_from!(redb::DatabaseError);
impl_error_from!(redb::StorageError);
impl_error_from!(redb::TransactionError);
impl_error_from!(redb::TableError);
impl_error_from!(redb::CommitError);

/// Create every table so read transactions never hit a missing table.
pub fn create_tables(db: &Database) -> Result<(), StoreError> {
    let write = db.begin_write()?;
    {
        write.open_table(PACKAGE_TABLE)?;
        write.open_table(PACKAGE_NAME_TABLE)?;
        write.open_table(REVIEW_TABLE)?;
        write.open_table(REVIEW_ID_TABLE)?;
    }
    write.commit()?;
    Ok(())
}

/// Embedded on-disk store. redb serializes write transactions, so every
/// mutation below runs its lookup and its write in one transaction.
#[derive(Clone)]
pub struct RedbStore {
    pub db: Arc<Database>,
}

impl RedbStore {
    pub fn new(db: Arc<Database>) -> Result<Self, StoreError> {
        create_tables(&db)?;
        Ok(Self { db })
    }

    /// Open or create the database file at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        let db = Database::create(path)?;
        log::info!("opened registry database at {}", path.display());
        Self::new(Arc::new(db))
    }
}

impl RegistryStore for RedbStore {
    fn list_packages(&self) -> Result<Vec<PackageModel>, StoreError> {
        let read = self.db.begin_read()?;
        let package_table = read.open_table(PACKAGE_TABLE)?;
        let mut out = vec![];
        for result in package_table.iter()? {
            let (_id, package) = result?;
            out.push(package.value());
        }
        sort_by_popularity(&mut out);
        Ok(out)
    }

    fn package_by_name(&self, name: &str) -> Result<Option<PackageModel>, StoreError> {
        let read = self.db.begin_read()?;
        let package_table = read.open_table(PACKAGE_TABLE)?;
        let package_name_table = read.open_table(PACKAGE_NAME_TABLE)?;
        if let Some(package_id) = package_name_table.get(name)?
            && let Some(package) = package_table.get(package_id.value())?
        {
            Ok(Some(package.value()))
        } else {
            Ok(None)
        }
    }

    fn insert_package(&self, package: NewPackage) -> Result<PackageModel, StoreError> {
        let write = self.db.begin_write()?;
        let package = {
            let mut package_name_table = write.open_table(PACKAGE_NAME_TABLE)?;
            if package_name_table.get(package.name.as_str())?.is_some() {
                // dropping `write` without commit aborts the transaction
                return Err(StoreError::Conflict(package.name));
            }
            let mut package_table = write.open_table(PACKAGE_TABLE)?;
            let package = package.into_model(nanoid!(), timestamp());
            package_name_table.insert(package.name.as_str(), package.id.as_str())?;
            package_table.insert(package.id.as_str(), package.clone())?;
            package
        };
        write.commit()?;
        Ok(package)
    }

    fn increment_downloads(&self, name: &str) -> Result<Option<PackageModel>, StoreError> {
        let write = self.db.begin_write()?;
        let package = {
            let package_name_table = write.open_table(PACKAGE_NAME_TABLE)?;
            let mut package_table = write.open_table(PACKAGE_TABLE)?;
            let package_id = match package_name_table.get(name)? {
                Some(id) => id.value().to_string(),
                None => return Ok(None),
            };
            let mut package = match package_table.get(package_id.as_str())? {
                Some(package) => package.value(),
                None => {
                    return Err(StoreError::Backend(format!(
                        "package name {name} registered without package document"
                    )));
                }
            };
            package.downloads += 1;
            package_table.insert(package_id.as_str(), package.clone())?;
            package
        };
        write.commit()?;
        Ok(Some(package))
    }

    fn package_count(&self) -> Result<u64, StoreError> {
        let read = self.db.begin_read()?;
        Ok(read.open_table(PACKAGE_TABLE)?.len()?)
    }

    fn total_downloads(&self) -> Result<u64, StoreError> {
        let read = self.db.begin_read()?;
        let package_table = read.open_table(PACKAGE_TABLE)?;
        let mut total = 0;
        for result in package_table.iter()? {
            let (_id, package) = result?;
            total += package.value().downloads;
        }
        Ok(total)
    }

    fn list_reviews(&self) -> Result<Vec<ReviewModel>, StoreError> {
        let read = self.db.begin_read()?;
        let review_table = read.open_table(REVIEW_TABLE)?;
        let mut out = vec![];
        for result in review_table.iter()?.rev() {
            let (_seq, review) = result?;
            out.push(review.value());
        }
        Ok(out)
    }

    fn insert_review(&self, review: NewReview) -> Result<ReviewModel, StoreError> {
        let write = self.db.begin_write()?;
        let review = {
            let mut review_table = write.open_table(REVIEW_TABLE)?;
            let mut review_id_table = write.open_table(REVIEW_ID_TABLE)?;
            let seq = match review_table.last()? {
                Some((seq, _)) => seq.value() + 1,
                None => 0,
            };
            let review = review.into_model(nanoid!(), timestamp());
            review_table.insert(seq, review.clone())?;
            review_id_table.insert(review.id.as_str(), seq)?;
            review
        };
        write.commit()?;
        Ok(review)
    }

    fn react_to_review(
        &self,
        id: &str,
        reaction: Reaction,
    ) -> Result<Option<ReviewModel>, StoreError> {
        let write = self.db.begin_write()?;
        let review = {
            let review_id_table = write.open_table(REVIEW_ID_TABLE)?;
            let mut review_table = write.open_table(REVIEW_TABLE)?;
            let seq = match review_id_table.get(id)? {
                Some(seq) => seq.value(),
                None => return Ok(None),
            };
            let mut review = match review_table.get(seq)? {
                Some(review) => review.value(),
                None => {
                    return Err(StoreError::Backend(format!(
                        "review {id} registered without review document"
                    )));
                }
            };
            review.react(reaction);
            review_table.insert(seq, review.clone())?;
            review
        };
        write.commit()?;
        Ok(Some(review))
    }

    fn review_count(&self) -> Result<u64, StoreError> {
        let read = self.db.begin_read()?;
        Ok(read.open_table(REVIEW_TABLE)?.len()?)
    }

    fn average_rating(&self) -> Result<Option<f64>, StoreError> {
        let read = self.db.begin_read()?;
        let review_table = read.open_table(REVIEW_TABLE)?;
        let mut ratings = vec![];
        for result in review_table.iter()? {
            let (_seq, review) = result?;
            ratings.push(review.value().rating);
        }
        Ok(mean_rating(ratings))
    }
}
