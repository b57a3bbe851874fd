use std::collections::{HashMap, HashSet};

/// Lookups built by the preflight stage and read by code rules.
///
/// Keys are lower-cased resource ids.
#[derive(Debug, Clone, Default)]
pub struct AuxiliaryIndexes {
    diagnostics: HashSet<String>,
    private_endpoints: HashSet<String>,
    public_ips: HashMap<String, Vec<String>>,
}

impl AuxiliaryIndexes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_diagnostics(&mut self, resource_id: &str) {
        self.diagnostics.insert(resource_id.to_lowercase());
    }

    /// `backend_id` is the private link service id the endpoint targets
    pub fn record_private_endpoint(&mut self, backend_id: &str) {
        self.private_endpoints.insert(backend_id.to_lowercase());
    }

    pub fn record_public_ip(&mut self, public_ip_id: &str, zones: Vec<String>) {
        self.public_ips.insert(public_ip_id.to_lowercase(), zones);
    }

    pub fn has_diagnostics(&self, resource_id: &str) -> bool {
        self.diagnostics.contains(&resource_id.to_lowercase())
    }

    pub fn has_private_endpoint(&self, resource_id: &str) -> bool {
        self.private_endpoints.contains(&resource_id.to_lowercase())
    }

    pub fn public_ip_zones(&self, public_ip_id: &str) -> Option<&[String]> {
        self.public_ips
            .get(&public_ip_id.to_lowercase())
            .map(Vec::as_slice)
    }

    pub fn diagnostics_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn private_endpoint_count(&self) -> usize {
        self.private_endpoints.len()
    }

    pub fn public_ip_count(&self) -> usize {
        self.public_ips.len()
    }
}
