/// Catalog source adapters (compiled-in trees and on-disk trees)
mod directory;
mod embedded;

pub use directory::DirectoryCatalog;
pub use embedded::EmbeddedCatalog;
