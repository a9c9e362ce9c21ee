use confique::Config;

/// Token issuance configuration
#[derive(Debug, Config, Clone)]
pub struct TokenConfig {
    /// Lifetime of issued access tokens in seconds (default: 3600 = 1 hour).
    /// Returned verbatim as `expires_in` in token responses.
    #[config(env = "AUTHD_TOKEN_TTL", default = 3600)]
    pub ttl: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self { ttl: 3600 }
    }
}
