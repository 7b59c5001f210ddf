use nebula_api::prelude::*;

use crate::error::NebulaError;
use crate::registry::Registry;
use crate::validate::validate_review;

impl Registry {
    pub fn list_reviews(&self) -> Result<ReviewListResponse, NebulaError> {
        let reviews = self.store.list_reviews()?;
        Ok(ReviewListResponse {
            success: true,
            count: reviews.len(),
            reviews,
            message: "Reviews fetched successfully".to_string(),
        })
    }

    pub fn submit_review(&self, request: ReviewRequest) -> Result<ReviewResponse, NebulaError> {
        let review = self.store.insert_review(validate_review(request)?)?;
        log::info!("review {} submitted with rating {}", review.id, review.rating);
        Ok(ReviewResponse {
            success: true,
            review,
            message: "Review submitted successfully!".to_string(),
        })
    }

    /// Identities are not tracked, the same reader may react repeatedly.
    pub fn react_to_review(
        &self,
        id: &str,
        reaction: Reaction,
    ) -> Result<ReviewResponse, NebulaError> {
        let review = self
            .store
            .react_to_review(id, reaction)?
            .ok_or_else(|| {
                NebulaError::not_found(
                    "Review not found",
                    &format!("Review '{id}' does not exist"),
                )
            })?;
        Ok(ReviewResponse {
            success: true,
            review,
            message: format!("Review {}d", reaction.path_segment()),
        })
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use nebula_api::ApiError;

    use super::*;
    use crate::tests::NebulaTestState;

    fn api_error(e: anyhow::Error) -> ApiError {
        e.downcast::<ApiError>().expect("expected an ApiError")
    }

    #[tokio::test]
    async fn rating_out_of_range_is_rejected() -> Result<()> {
        let test = NebulaTestState::new().await?;

        for rating in [0, 6] {
            let e = api_error(
                test.api
                    .submit_review(ReviewRequest::new("reviewer", rating, "title", "comment"))
                    .await
                    .unwrap_err(),
            );
            assert!(e.is_invalid_argument());
        }
        assert!(test.api.load_reviews().await?.is_empty());

        let review = test
            .api
            .submit_review(ReviewRequest::new("reviewer", 3, "title", "comment"))
            .await?;
        assert_eq!(review.rating, 3);
        assert_eq!((review.likes, review.dislikes), (0, 0));
        assert!(!review.mind_destroyed);
        Ok(())
    }

    #[tokio::test]
    async fn missing_review_fields_are_rejected() -> Result<()> {
        let test = NebulaTestState::new().await?;

        let mut request = ReviewRequest::new("reviewer", 4, "title", "comment");
        request.comment = Some(String::new());
        let e = api_error(test.api.submit_review(request).await.unwrap_err());
        assert!(e.is_invalid_argument());
        assert_eq!(e.error, "Missing required fields");
        Ok(())
    }

    #[tokio::test]
    async fn reviews_are_listed_newest_first() -> Result<()> {
        let test = NebulaTestState::new().await?;

        let mut request = ReviewRequest::new("first", 5, "title", "comment");
        request.mind_destroyed = Some(true);
        let first = test.api.submit_review(request).await?;
        let second = test
            .api
            .submit_review(ReviewRequest::new("second", 4, "title", "comment"))
            .await?;
        assert!(first.mind_destroyed);

        let reviews = test.api.load_reviews().await?;
        assert_eq!(reviews, vec![second, first]);
        Ok(())
    }

    #[tokio::test]
    async fn like_and_dislike_counters() -> Result<()> {
        let test = NebulaTestState::new().await?;
        let review = test
            .api
            .submit_review(ReviewRequest::new("reviewer", 5, "title", "comment"))
            .await?;

        test.api.react(&review.id, Reaction::Like).await?;
        test.api.react(&review.id, Reaction::Like).await?;
        let review = test.api.react(&review.id, Reaction::Dislike).await?;
        assert_eq!((review.likes, review.dislikes), (2, 1));

        let e = api_error(test.api.react("missing", Reaction::Like).await.unwrap_err());
        assert!(e.is_not_found());
        Ok(())
    }
}
