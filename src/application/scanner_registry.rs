use crate::audit::domain::Recommendation;
use crate::ports::outbound::ServiceScanner;
use crate::shared::error::AuditError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Code scanners keyed by abbreviation
#[derive(Clone, Default)]
pub struct ScannerRegistry {
    scanners: BTreeMap<&'static str, Arc<dyn ServiceScanner>>,
}

impl ScannerRegistry {
    pub fn new<I>(scanners: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ServiceScanner>>,
    {
        Self {
            scanners: scanners
                .into_iter()
                .map(|s| (s.abbreviation(), s))
                .collect(),
        }
    }

    /// Keeps only the scanners named in `keys`; an empty list keeps all.
    ///
    /// # Errors
    /// Returns `AuditError::InvalidArguments` for an unknown abbreviation
    pub fn select(&self, keys: &[String]) -> Result<Self, AuditError> {
        if keys.is_empty() {
            return Ok(self.clone());
        }
        let mut selected = BTreeMap::new();
        for key in keys {
            let key = key.trim().to_lowercase();
            let Some((abbr, scanner)) = self.scanners.get_key_value(key.as_str()) else {
                return Err(AuditError::InvalidArguments {
                    message: format!("Unknown scanner: {}", key),
                    hint: format!("Available scanners: {}", self.abbreviations().join(", ")),
                });
            };
            selected.insert(*abbr, Arc::clone(scanner));
        }
        Ok(Self { scanners: selected })
    }

    pub fn get(&self, abbreviation: &str) -> Option<&Arc<dyn ServiceScanner>> {
        self.scanners.get(abbreviation)
    }

    pub fn abbreviations(&self) -> Vec<&'static str> {
        self.scanners.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ServiceScanner>> {
        self.scanners.values()
    }

    /// Every type covered by at least one scanner, sorted
    pub fn resource_types(&self) -> Vec<&'static str> {
        let mut types: Vec<&'static str> = self
            .scanners
            .values()
            .flat_map(|s| s.resource_types().iter().copied())
            .collect();
        types.sort_unstable();
        types.dedup();
        types
    }

    pub fn recommendations(&self) -> Vec<Recommendation> {
        self.scanners
            .values()
            .flat_map(|s| s.recommendations())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.scanners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scanners.is_empty()
    }
}
