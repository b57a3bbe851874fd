/// Application layer - Use cases, pipeline and DTOs
///
/// This layer orchestrates the audit domain services and coordinates with
/// infrastructure through ports. The stage pipeline, worker pool and rate
/// limiter live here because they schedule work rather than decide it.
pub mod dto;
pub mod factories;
pub mod pipeline;
pub mod rate_limiter;
pub mod read_models;
pub mod scan_context;
pub mod scan_services;
pub mod scanner_registry;
pub mod stages;
pub mod use_cases;
pub mod worker_pool;

#[cfg(test)]
pub(crate) mod test_support;
