mod catalog;
mod rule_engine;
pub mod subscription_mask;

pub use catalog::{Catalog, CatalogFile, CatalogLoadSummary};
pub use rule_engine::RuleEngine;
