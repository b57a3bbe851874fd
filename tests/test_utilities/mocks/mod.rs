/// Mock implementations for testing
mod mock_graph_query;
mod mock_management_api;
mod mock_plugin_repository;
mod mock_progress_reporter;

pub use mock_graph_query::MockGraphQuery;
pub use mock_management_api::MockManagementApi;
pub use mock_plugin_repository::MockPluginRepository;
pub use mock_progress_reporter::MockProgressReporter;
