use std::ops::RangeInclusive;

use nebula_api::prelude::*;

use crate::error::NebulaError;
use crate::store::NewPackage;
use crate::store::NewReview;

pub const QUANTUM_LEVELS: RangeInclusive<u8> = 1..=11;
pub const RATINGS: RangeInclusive<u8> = 1..=5;

/// Absent, null and empty strings all count as missing.
fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

fn in_range(value: i64, range: &RangeInclusive<u8>) -> Option<u8> {
    u8::try_from(value).ok().filter(|value| range.contains(value))
}

pub fn validate_publish(request: PublishRequest) -> Result<NewPackage, NebulaError> {
    let PublishRequest {
        name,
        version,
        description,
        author,
        quantum_level,
        code,
    } = request;
    let (Some(name), Some(version), Some(description), Some(author), Some(code)) = (
        required(name),
        required(version),
        required(description),
        required(author),
        required(code),
    ) else {
        return Err(NebulaError::invalid_argument(
            "Missing required fields",
            "name, version, description, author, and code are required",
        ));
    };
    let quantum_level = match quantum_level {
        None => DEFAULT_QUANTUM_LEVEL,
        Some(level) => in_range(level, &QUANTUM_LEVELS).ok_or_else(|| {
            NebulaError::invalid_argument(
                "Invalid quantum level",
                "Quantum level must be between 1 and 11",
            )
        })?,
    };
    Ok(NewPackage {
        name,
        version,
        description,
        author,
        quantum_level,
        code,
    })
}

pub fn validate_review(request: ReviewRequest) -> Result<NewReview, NebulaError> {
    let ReviewRequest {
        name,
        rating,
        title,
        comment,
        mind_destroyed,
    } = request;
    let (Some(name), Some(rating), Some(title), Some(comment)) =
        (required(name), rating, required(title), required(comment))
    else {
        return Err(NebulaError::invalid_argument(
            "Missing required fields",
            "name, rating, title, and comment are required",
        ));
    };
    let rating = in_range(rating, &RATINGS).ok_or_else(|| {
        NebulaError::invalid_argument("Invalid rating", "Rating must be between 1 and 5")
    })?;
    Ok(NewReview {
        name,
        rating,
        title,
        comment,
        mind_destroyed: mind_destroyed.unwrap_or(false),
    })
}

/// Non empty after trimming.
pub fn validate_query(query: Option<String>) -> Result<String, NebulaError> {
    query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            NebulaError::invalid_argument("Missing search query", "A search query is required")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn publish() -> PublishRequest {
        PublishRequest::new("a", "1.0", "d", "x", "Main { Print \"hi\" }")
    }

    #[test]
    fn every_publish_field_is_required() {
        let strip: [fn(&mut PublishRequest); 5] = [
            |r| r.name = None,
            |r| r.version = None,
            |r| r.description = Some(String::new()),
            |r| r.author = None,
            |r| r.code = Some(String::new()),
        ];
        for strip_field in strip {
            let mut request = publish();
            strip_field(&mut request);
            let e = validate_publish(request).unwrap_err();
            assert_eq!(e.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn quantum_level_bounds() {
        for level in [0, 12, -1, 300] {
            let e = validate_publish(publish().with_quantum_level(level)).unwrap_err();
            assert_eq!(e.kind(), ErrorKind::InvalidArgument);
            assert_eq!(e.message(), "Quantum level must be between 1 and 11");
        }
        for level in 1..=11 {
            let package = validate_publish(publish().with_quantum_level(level)).unwrap();
            assert_eq!(package.quantum_level as i64, level);
        }
    }

    #[test]
    fn quantum_level_defaults_to_one() {
        assert_eq!(validate_publish(publish()).unwrap().quantum_level, 1);
    }

    #[test]
    fn rating_bounds() {
        for rating in [0, 6, -3] {
            let e = validate_review(ReviewRequest::new("n", rating, "t", "c")).unwrap_err();
            assert_eq!(e.kind(), ErrorKind::InvalidArgument);
        }
        let review = validate_review(ReviewRequest::new("n", 3, "t", "c")).unwrap();
        assert_eq!(review.rating, 3);
        assert!(!review.mind_destroyed);
    }

    #[test]
    fn review_requires_rating() {
        let mut request = ReviewRequest::new("n", 3, "t", "c");
        request.rating = None;
        let e = validate_review(request).unwrap_err();
        assert_eq!(e.message(), "name, rating, title, and comment are required");
    }

    #[test]
    fn query_is_trimmed() {
        assert_eq!(validate_query(Some("  neural ".to_string())).unwrap(), "neural");
        assert!(validate_query(Some("   ".to_string())).is_err());
        assert!(validate_query(None).is_err());
    }
}
