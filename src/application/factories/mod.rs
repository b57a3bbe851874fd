mod catalog_factory;
mod presenter_factory;
mod renderer_factory;

pub use catalog_factory::CatalogFactory;
pub use presenter_factory::{PresenterFactory, PresenterType};
pub use renderer_factory::RendererFactory;
