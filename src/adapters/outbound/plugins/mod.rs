/// Plugin adapters
mod yaml_plugin;

pub use yaml_plugin::YamlPluginRepository;
