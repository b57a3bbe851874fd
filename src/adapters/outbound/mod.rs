/// Outbound adapters - Infrastructure implementations of outbound ports
pub mod catalog;
pub mod console;
pub mod credentials;
pub mod filesystem;
pub mod formatters;
pub mod network;
pub mod plugins;
pub mod scanners;
