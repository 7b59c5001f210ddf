use nebula_api::prelude::*;

pub fn package_line(package: &PackageModel) -> String {
    format!(
        "{} v{} - {} ({} downloads)",
        package.name, package.version, package.description, package.downloads
    )
}

pub fn package_details(package: &PackageModel) -> String {
    [
        format!("{} v{}", package.name, package.version),
        format!("  {}", package.description),
        format!("  author:        {}", package.author),
        format!(
            "  quantum level: {}/11 - {}",
            package.quantum_level,
            package.quantum_description()
        ),
        format!("  downloads:     {}", package.downloads),
    ]
    .join("\n")
}

pub fn packages(packages: &[PackageModel]) -> String {
    if packages.is_empty() {
        return "No packages found".to_string();
    }
    packages
        .iter()
        .map(package_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn stars(rating: u8) -> String {
    let filled = rating.min(5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

pub fn review(review: &ReviewModel) -> String {
    let mut out = format!(
        "{} {} by {}\n  {}\n  +{} -{}  id: {}",
        stars(review.rating),
        review.title,
        review.name,
        review.comment,
        review.likes,
        review.dislikes,
        review.id
    );
    if review.mind_destroyed {
        out.push_str("  (mind destroyed)");
    }
    out
}

pub fn reviews(reviews: &[ReviewModel]) -> String {
    if reviews.is_empty() {
        return "No reviews yet".to_string();
    }
    reviews
        .iter()
        .map(review)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn or_unavailable<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unavailable".to_string())
}

pub fn stats(stats: &RegistryStats) -> String {
    [
        format!("Trica {}", stats.version),
        format!("  packages:       {}", or_unavailable(stats.packages)),
        format!("  reviews:        {}", or_unavailable(stats.reviews)),
        format!("  downloads:      {}", or_unavailable(stats.total_downloads)),
        format!(
            "  average rating: {}",
            or_unavailable(stats.average_rating.map(|r| format!("{r:.1}")))
        ),
        format!("  features:       {}", stats.features.join(", ")),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package() -> PackageModel {
        PackageModel {
            id: "id".to_string(),
            name: "time_travel".to_string(),
            version: "1.0.0".to_string(),
            description: "Temporal paradox resolution".to_string(),
            author: "Trica Temporal Labs".to_string(),
            quantum_level: 9,
            code: "Main {}".to_string(),
            downloads: 7,
            created_at: 0,
        }
    }

    #[test]
    fn package_output() {
        assert_eq!(
            package_line(&package()),
            "time_travel v1.0.0 - Temporal paradox resolution (7 downloads)"
        );
        assert!(package_details(&package()).contains("quantum level: 9/11 - Mind-destroying"));
        assert_eq!(packages(&[]), "No packages found");
    }

    #[test]
    fn star_rating() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(9), "★★★★★");
    }

    #[test]
    fn missing_aggregates_print_unavailable() {
        let out = stats(&RegistryStats {
            packages: Some(2),
            reviews: None,
            total_downloads: Some(10),
            average_rating: Some(4.25),
            version: TRICA_VERSION.to_string(),
            features: vec![],
            unavailable: vec!["reviews".to_string()],
        });
        assert!(out.contains("reviews:        unavailable"));
        assert!(out.contains("average rating: 4.2") || out.contains("average rating: 4.3"));
    }
}
