use azqr::prelude::*;

/// Mock PluginRepository for testing
#[derive(Default)]
pub struct MockPluginRepository {
    pub plugins: Vec<PluginDefinition>,
    pub should_fail: bool,
}

impl MockPluginRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plugin(mut self, plugin: PluginDefinition) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn with_failure() -> Self {
        Self {
            plugins: Vec::new(),
            should_fail: true,
        }
    }
}

impl PluginRepository for MockPluginRepository {
    fn load_all(&self) -> Result<Vec<PluginDefinition>> {
        if self.should_fail {
            anyhow::bail!("Mock plugin repository failure");
        }
        Ok(self.plugins.clone())
    }
}
