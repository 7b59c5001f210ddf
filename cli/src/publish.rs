use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use dialoguer::Confirm;
use nebula_api::prelude::*;

pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub quantum_level: Option<i64>,
}

/// Build a publish request from package info and the source file at `path`.
pub fn build_request(info: PackageInfo, path: &Path) -> Result<PublishRequest> {
    let code = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read source file: {:?}", path))?;
    if code.trim().is_empty() {
        anyhow::bail!("Source file is empty: {:?}", path);
    }
    let request = PublishRequest::new(
        &info.name,
        &info.version,
        &info.description,
        &info.author,
        &code,
    );
    Ok(match info.quantum_level {
        Some(level) => request.with_quantum_level(level),
        None => request,
    })
}

pub async fn publish(api: &NebulaApi, request: PublishRequest, yes: bool) -> Result<PackageModel> {
    let name = request.name.clone().unwrap_or_default();
    let version = request.version.clone().unwrap_or_default();
    if !yes
        && !Confirm::new()
            .with_prompt(format!("Publish {name} v{version} to {}?", api.url))
            .default(false)
            .interact()?
    {
        anyhow::bail!("Publish cancelled");
    }
    api.publish(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(quantum_level: Option<i64>) -> PackageInfo {
        PackageInfo {
            name: "mind_destruction".to_string(),
            version: "0.1.0".to_string(),
            description: "d".to_string(),
            author: "a".to_string(),
            quantum_level,
        }
    }

    #[test]
    fn reads_source_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("main.trica");
        std::fs::write(&path, "Main { Print \"boom\" }")?;

        let request = build_request(info(Some(11)), &path)?;
        assert_eq!(request.code.as_deref(), Some("Main { Print \"boom\" }"));
        assert_eq!(request.quantum_level, Some(11));
        assert_eq!(build_request(info(None), &path)?.quantum_level, None);
        Ok(())
    }

    #[test]
    fn empty_or_missing_source_fails() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("main.trica");
        assert!(build_request(info(None), &path).is_err());
        std::fs::write(&path, "  \n")?;
        assert!(build_request(info(None), &path).is_err());
        Ok(())
    }
}
