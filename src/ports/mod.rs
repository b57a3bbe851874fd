/// Ports module defining interfaces for hexagonal architecture
///
/// Outbound (driven) ports only: the CLI drives the use case directly.
pub mod outbound;
