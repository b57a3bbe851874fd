/// Network adapters for the cloud provider's REST endpoints
mod http;
mod management_client;
mod resource_graph_client;
mod retry;

pub use management_client::ManagementClient;
pub use resource_graph_client::ResourceGraphClient;
pub use retry::RetryPolicy;
