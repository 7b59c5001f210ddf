use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use nanoid::nanoid;
use nebula_api::prelude::*;
use tempfile::TempDir;

use super::NebulaState;
use super::build_server;
use crate::config::Config;
use crate::config::RateLimitSection;
use crate::store::MemoryStore;
use crate::store::NewPackage;
use crate::store::NewReview;
use crate::store::RedbStore;
use crate::store::RegistryStore;
use crate::store::StoreError;

/// A real server on a random local port backed by a throwaway redb file.
pub struct NebulaTestState {
    pub url: String,
    pub api: NebulaApi,
    pub store: Arc<RedbStore>,
    _tmpdir: TempDir,
}

impl NebulaTestState {
    pub async fn new() -> Result<Self> {
        let mut config = Config::default();
        config.rate_limit = RateLimitSection {
            max_requests: 0,
            window_secs: 0,
        };
        Self::with_config(config).await
    }

    pub async fn with_config(config: Config) -> Result<Self> {
        let tmpdir = TempDir::new()?;
        let db_path = tmpdir.path().join(format!("{}.redb", nanoid!()));
        let store = Arc::new(RedbStore::open(&db_path)?);

        let app = build_server(NebulaState::new(store.clone(), &config), &config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let url = format!("http://{addr}");
        Ok(Self {
            api: NebulaApi::new(url.clone())?,
            url,
            store,
            _tmpdir: tmpdir,
        })
    }

    /// Publish a package with a random name unless one is given.
    pub async fn publish(&self, name: Option<&str>) -> Result<PackageModel> {
        let name = name.map(str::to_string).unwrap_or_else(|| nanoid!());
        let package = self
            .api
            .publish(PublishRequest::new(
                &name,
                "1.0.0",
                "test package",
                "tester",
                "Main { Print \"test\" }",
            ))
            .await?;
        assert_eq!(package.name, name);
        assert!(package.created_at.abs_diff(timestamp()) < 10);
        Ok(package)
    }
}

/// In-process router over an empty `MemoryStore`, for axum-test.
pub fn memory_server() -> Router {
    memory_server_with(&Config::default())
}

pub fn memory_server_with(config: &Config) -> Router {
    build_server(
        NebulaState::new(Arc::new(MemoryStore::default()), config),
        config,
    )
}

/// Delegates to a `MemoryStore` but always fails the review side. With
/// `fail_everything` the package side fails too, with `panic_on_list`
/// listing packages panics.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_everything: bool,
    pub panic_on_list: bool,
}

/// Backend detail that must never reach a client.
pub const FLAKY_CAUSE: &str = "connection reset by /var/lib/nebula";

impl FlakyStore {
    fn down() -> StoreError {
        StoreError::Backend(FLAKY_CAUSE.to_string())
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail_everything {
            Err(Self::down())
        } else {
            Ok(())
        }
    }
}

impl RegistryStore for FlakyStore {
    fn list_packages(&self) -> Result<Vec<PackageModel>, StoreError> {
        if self.panic_on_list {
            panic!("{FLAKY_CAUSE}");
        }
        self.check()?;
        self.inner.list_packages()
    }
    fn package_by_name(&self, name: &str) -> Result<Option<PackageModel>, StoreError> {
        self.check()?;
        self.inner.package_by_name(name)
    }
    fn insert_package(&self, package: NewPackage) -> Result<PackageModel, StoreError> {
        self.inner.insert_package(package)
    }
    fn increment_downloads(&self, name: &str) -> Result<Option<PackageModel>, StoreError> {
        self.inner.increment_downloads(name)
    }
    fn package_count(&self) -> Result<u64, StoreError> {
        self.check()?;
        self.inner.package_count()
    }
    fn total_downloads(&self) -> Result<u64, StoreError> {
        self.check()?;
        self.inner.total_downloads()
    }
    fn list_reviews(&self) -> Result<Vec<ReviewModel>, StoreError> {
        Err(Self::down())
    }
    fn insert_review(&self, review: NewReview) -> Result<ReviewModel, StoreError> {
        self.inner.insert_review(review)
    }
    fn react_to_review(
        &self,
        _id: &str,
        _reaction: Reaction,
    ) -> Result<Option<ReviewModel>, StoreError> {
        Err(Self::down())
    }
    fn review_count(&self) -> Result<u64, StoreError> {
        Err(Self::down())
    }
    fn average_rating(&self) -> Result<Option<f64>, StoreError> {
        Err(Self::down())
    }
}

/// In-process router over `store`, for axum-test.
pub fn server_over(store: impl RegistryStore + 'static) -> Router {
    let config = Config::default();
    build_server(NebulaState::new(Arc::new(store), &config), &config)
}
