use crate::audit::domain::Source;
use crate::audit::services::CatalogFile;
use crate::ports::outbound::CatalogSource;
use crate::shared::Result;

macro_rules! catalog_files {
    ($root:literal; $($path:literal),* $(,)?) => {
        &[$(($path, include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/catalog/", $root, "/", $path)))),*]
    };
}

/// Curated best-practice tree, compiled into the binary
const APRL_FILES: &[(&str, &str)] = catalog_files!("aprl";
    "azure-resources/Compute/virtualMachines/kql/122d11d7-b91f-8747-a562-f56b79bcfbdc.kql",
    "azure-resources/Compute/virtualMachines/kql/1981f704-97b9-b645-9c57-33f8ded9261a.kql",
    "azure-resources/Compute/virtualMachines/kql/2bd0be95-a825-6f47-a8c6-3db1fb5eb387.kql",
    "azure-resources/Compute/virtualMachines/recommendations.yaml",
    "azure-resources/KeyVault/vaults/kql/1cca00d2-d9ab-8e45-a5ab-b7d8a2f4b2a4.kql",
    "azure-resources/KeyVault/vaults/kql/70fcfe6d-00e9-5544-a63a-fff42b9f2edb.kql",
    "azure-resources/KeyVault/vaults/recommendations.yaml",
    "azure-resources/Network/publicIPAddresses/kql/1adba190-f0a4-ba4b-a1c6-4b8ab8d1b6b2.kql",
    "azure-resources/Network/publicIPAddresses/kql/c63b81fb-7afc-894c-a840-91bb8b4dcfdb.kql",
    "azure-resources/Network/publicIPAddresses/recommendations.yaml",
    "azure-resources/Storage/storageAccounts/kql/1b965cb9-7629-214e-b682-6bf6e450a100.kql",
    "azure-resources/Storage/storageAccounts/kql/2ad78dec-5a4d-4a30-8fd1-8584335ad781.kql",
    "azure-resources/Storage/storageAccounts/kql/e6c7e1cc-2f47-264d-aa50-1da421314472.kql",
    "azure-resources/Storage/storageAccounts/recommendations.yaml",
);

/// Orphan/cleanup tree, compiled into the binary
const ORPHAN_FILES: &[(&str, &str)] = catalog_files!("orphan";
    "azure-orphan-resources/Compute/disks/kql/6d2a2d30-2d83-4c22-a8ec-7e1f0b3f2f1a.kql",
    "azure-orphan-resources/Compute/disks/recommendations.yaml",
    "azure-orphan-resources/Network/networkSecurityGroups/kql/9b7a5e2c-3c1d-4b8e-8f6a-2d5c7e1a0b93.kql",
    "azure-orphan-resources/Network/networkSecurityGroups/recommendations.yaml",
    "azure-orphan-resources/Network/publicIPAddresses/kql/4e7f4c6e-1f3a-4d52-9a1c-0f2d0b7c9f34.kql",
    "azure-orphan-resources/Network/publicIPAddresses/recommendations.yaml",
);

/// EmbeddedCatalog adapter serving one of the built-in trees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddedCatalog {
    Aprl,
    Orphan,
}

impl EmbeddedCatalog {
    pub fn all() -> [EmbeddedCatalog; 2] {
        [EmbeddedCatalog::Aprl, EmbeddedCatalog::Orphan]
    }

    fn entries(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            EmbeddedCatalog::Aprl => APRL_FILES,
            EmbeddedCatalog::Orphan => ORPHAN_FILES,
        }
    }
}

impl CatalogSource for EmbeddedCatalog {
    fn source(&self) -> Source {
        match self {
            EmbeddedCatalog::Aprl => Source::Aprl,
            EmbeddedCatalog::Orphan => Source::Orphan,
        }
    }

    fn files(&self) -> Result<Vec<CatalogFile>> {
        Ok(self
            .entries()
            .iter()
            .map(|(path, contents)| CatalogFile::new(*path, *contents))
            .collect())
    }
}
