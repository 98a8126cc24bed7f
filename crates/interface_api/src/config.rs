//! API configuration

use core_kernel::AccessPolicy;
use domain_org::UpdatePrecondition;
use serde::Deserialize;

/// Environment prefix of every setting, e.g. `LEDGER_PORT`
pub const ENV_PREFIX: &str = "LEDGER";

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Secret verifying caller identity tokens
    pub jwt_secret: String,
    /// Log level
    pub log_level: String,
    /// Issuing authority whose `admin` claim grants super-admin
    pub admin_msp_id: String,
    /// Prefix of identity attribute names
    pub attribute_prefix: String,
    /// Existence rule applied to organization updates
    pub update_precondition: UpdatePrecondition,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let policy = AccessPolicy::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            log_level: "info".to_string(),
            admin_msp_id: policy.admin_msp_id,
            attribute_prefix: policy.attribute_prefix,
            update_precondition: UpdatePrecondition::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `LEDGER_*` environment variables
    ///
    /// Unset variables keep their default.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("log_level", defaults.log_level)?
            .set_default("admin_msp_id", defaults.admin_msp_id)?
            .set_default("attribute_prefix", defaults.attribute_prefix)?
            .set_default("update_precondition", defaults.update_precondition.to_string())?
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the authorization policy described by this configuration
    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::new(self.admin_msp_id.clone()).with_attribute_prefix(self.attribute_prefix.clone())
    }
}
