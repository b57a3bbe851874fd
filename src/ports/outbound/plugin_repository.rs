use crate::audit::domain::PluginDefinition;
use crate::shared::Result;

/// PluginRepository port for YAML plugin definitions
pub trait PluginRepository {
    /// Loads every plugin the repository knows about
    ///
    /// # Errors
    /// Returns an error if a plugin file is unreadable or invalid
    fn load_all(&self) -> Result<Vec<PluginDefinition>>;
}
