use std::fmt;

/// Everything the check needs, resolved once at startup.
#[derive(Debug, Clone, Default)]
pub struct CheckConfig {
    pub region: Option<String>,
    pub credentials: Option<StaticCredentials>,
    pub log_group_name: String,
    pub max_pages: Option<u32>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

// Keep the secret out of debug logs.
impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .finish()
    }
}
