use anyhow::Result;
use reqwest::Response;
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::ApiError;
use super::types::*;
use crate::REGISTRY_URL;
use crate::db::*;

#[derive(Clone, Debug)]
pub struct NebulaApi {
    pub url: String,
    client: reqwest::Client,
}

impl Default for NebulaApi {
    fn default() -> Self {
        Self {
            url: REGISTRY_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

impl NebulaApi {
    pub fn new(url: String) -> Result<Self> {
        // fail early on garbage urls instead of on the first request
        Url::parse(&url)?;
        Ok(Self {
            url,
            client: reqwest::Client::new(),
        })
    }

    /// Join path segments onto the registry url, percent encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("registry url cannot be a base: {}", self.url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(ApiError::from_response(response).await.into())
        }
    }

    pub async fn status(&self) -> Result<StatusResponse> {
        let response = self.client.get(self.endpoint(&["status"])?).send().await?;
        Self::parse(response).await
    }

    /// All packages, most downloaded first.
    pub async fn load_packages(&self) -> Result<Vec<PackageModel>> {
        let response = self
            .client
            .get(self.endpoint(&["packages"])?)
            .send()
            .await?;
        let data: PackageListResponse = Self::parse(response).await?;
        Ok(data.packages)
    }

    pub async fn search_packages(&self, query: &str) -> Result<Vec<PackageModel>> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut().append_pair("q", query);
        let response = self.client.get(url).send().await?;
        let data: PackageListResponse = Self::parse(response).await?;
        Ok(data.packages)
    }

    pub async fn load_package(&self, package_name: &str) -> Result<PackageModel> {
        let response = self
            .client
            .get(self.endpoint(&["packages", package_name])?)
            .send()
            .await?;
        let data: PackageResponse = Self::parse(response).await?;
        Ok(data.package)
    }

    pub async fn publish(&self, request: PublishRequest) -> Result<PackageModel> {
        let response = self
            .client
            .post(self.endpoint(&["packages"])?)
            .json(&request)
            .send()
            .await?;
        let data: PackageResponse = Self::parse(response).await?;
        Ok(data.package)
    }

    /// Record an install of `package_name`. Returns the updated package and
    /// the registry's install message.
    pub async fn install(&self, package_name: &str) -> Result<PackageResponse> {
        let response = self
            .client
            .post(self.endpoint(&["packages", package_name, "install"])?)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// All reviews, newest first.
    pub async fn load_reviews(&self) -> Result<Vec<ReviewModel>> {
        let response = self
            .client
            .get(self.endpoint(&["reviews"])?)
            .send()
            .await?;
        let data: ReviewListResponse = Self::parse(response).await?;
        Ok(data.reviews)
    }

    pub async fn submit_review(&self, request: ReviewRequest) -> Result<ReviewModel> {
        let response = self
            .client
            .post(self.endpoint(&["reviews"])?)
            .json(&request)
            .send()
            .await?;
        let data: ReviewResponse = Self::parse(response).await?;
        Ok(data.review)
    }

    pub async fn react(&self, review_id: &str, reaction: Reaction) -> Result<ReviewModel> {
        let response = self
            .client
            .post(self.endpoint(&["reviews", review_id, reaction.path_segment()])?)
            .send()
            .await?;
        let data: ReviewResponse = Self::parse(response).await?;
        Ok(data.review)
    }

    pub async fn execute(&self, code: &str) -> Result<ExecuteResponse> {
        let response = self
            .client
            .post(self.endpoint(&["execute"])?)
            .json(&ExecuteRequest {
                code: Some(code.to_string()),
            })
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn stats(&self) -> Result<RegistryStats> {
        let response = self.client.get(self.endpoint(&["stats"])?).send().await?;
        let data: StatsResponse = Self::parse(response).await?;
        Ok(data.stats)
    }
}
