/// Credential adapters producing management-endpoint access tokens
mod cli_token_provider;

pub use cli_token_provider::CliTokenProvider;
