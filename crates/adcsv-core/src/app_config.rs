use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Contact details served from the root endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityConfig {
    pub name: String,
    pub email: String,
    pub linkedin: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub upstream_base_url: String,
    pub upstream_token: String,
    pub upstream_timeout_secs: u64,
    pub upstream_user_agent: String,
    pub upstream_max_pages: u64,
    pub identity: IdentityConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("upstream_base_url", &self.upstream_base_url)
            .field("upstream_token", &"[redacted]")
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("upstream_user_agent", &self.upstream_user_agent)
            .field("upstream_max_pages", &self.upstream_max_pages)
            .field("identity", &self.identity)
            .finish()
    }
}
