use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Result;
use nebula_api::prelude::*;

/// Installed packages live in `<project>/.tpkg/<name>/main.trica`.
pub const INSTALL_DIR: &str = ".tpkg";
pub const ENTRY_FILE: &str = "main.trica";

/// Where `name` is installed under `root`. Names that would escape the
/// install directory are refused.
pub fn package_dir(root: &Path, name: &str) -> Result<PathBuf> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(root.join(INSTALL_DIR).join(name)),
        _ => anyhow::bail!("refusing to install package with unsafe name: {name:?}"),
    }
}

pub fn write_package(root: &Path, package: &PackageModel) -> Result<PathBuf> {
    let dir = package_dir(root, &package.name)?;
    std::fs::create_dir_all(&dir)?;
    let entry = dir.join(ENTRY_FILE);
    std::fs::write(&entry, &package.code)?;
    Ok(entry)
}

/// Record the install on the registry, then write the code locally.
pub async fn install(api: &NebulaApi, root: &Path, name: &str) -> Result<PathBuf> {
    // check the name before the registry counts a download
    package_dir(root, name)?;
    let response = api.install(name).await?;
    log::debug!("{}", response.message);
    let entry = write_package(root, &response.package)?;
    if let Some(message) = response.install_message {
        println!("{message}");
    }
    Ok(entry)
}
