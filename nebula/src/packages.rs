use nebula_api::prelude::*;

use crate::error::NebulaError;
use crate::registry::Registry;
use crate::store::StoreError;
use crate::validate::validate_publish;
use crate::validate::validate_query;

fn package_not_found(name: &str) -> NebulaError {
    NebulaError::not_found(
        "Package not found",
        &format!("Package '{name}' does not exist"),
    )
}

/// Message shown to whoever just installed `package`.
pub fn install_message(package: &PackageModel) -> String {
    match package.name.as_str() {
        "neural_networks" => {
            "Neural networks installed! Your consciousness is now quantum-enhanced.".to_string()
        }
        "time_travel" => {
            "Time travel package installed! Temporal paradoxes are now your playground."
                .to_string()
        }
        "quantum_computing" => {
            "Quantum computing installed! Reality bending capabilities unlocked.".to_string()
        }
        "mind_destruction" => "Ultimate mind destruction installed! Welcome to the void.".to_string(),
        "reality_bending" => {
            "Reality bending installed! Physics laws are now optional.".to_string()
        }
        name => format!(
            "Package '{name}' installed successfully! Quantum level {} capabilities unlocked.",
            package.quantum_level
        ),
    }
}

impl Registry {
    pub fn list_packages(&self) -> Result<PackageListResponse, NebulaError> {
        let packages = self.store.list_packages()?;
        Ok(PackageListResponse {
            success: true,
            count: packages.len(),
            packages,
            message: "Packages fetched successfully".to_string(),
        })
    }

    pub fn search_packages(&self, query: Option<String>) -> Result<PackageListResponse, NebulaError> {
        let query = validate_query(query)?;
        let packages = self.store.search_packages(&query)?;
        Ok(PackageListResponse {
            success: true,
            count: packages.len(),
            packages,
            message: format!("Packages matching '{query}' fetched successfully"),
        })
    }

    pub fn get_package(&self, name: &str) -> Result<PackageResponse, NebulaError> {
        let package = self
            .store
            .package_by_name(name)?
            .ok_or_else(|| package_not_found(name))?;
        Ok(PackageResponse {
            success: true,
            package,
            message: format!("Package '{name}' fetched successfully"),
            install_message: None,
        })
    }

    /// Validation happens before the store is touched, a rejected request
    /// writes nothing.
    pub fn publish_package(&self, request: PublishRequest) -> Result<PackageResponse, NebulaError> {
        let package = validate_publish(request)?;
        let package = self.store.insert_package(package).map_err(|e| match e {
            StoreError::Conflict(name) => {
                log::debug!("rejected duplicate publish of {name}");
                NebulaError::conflict(
                    "Package already exists",
                    "A package with this name already exists",
                )
            }
            e => e.into(),
        })?;
        log::info!("published package {}@{}", package.name, package.version);
        Ok(PackageResponse {
            success: true,
            message: format!("Package '{}' published successfully!", package.name),
            package,
            install_message: None,
        })
    }

    pub fn install_package(&self, name: &str) -> Result<PackageResponse, NebulaError> {
        let package = self
            .store
            .increment_downloads(name)?
            .ok_or_else(|| package_not_found(name))?;
        Ok(PackageResponse {
            success: true,
            message: format!("Package '{name}' download count updated"),
            install_message: Some(install_message(&package)),
            package,
        })
    }
}
