use std::time::Duration;

pub const DEFAULT_RELEASE_BASE_URI: &str = "http://hudson:8081/nexus/service/local/repositories";
pub const DEFAULT_ENG_BASE_URI: &str = "http://maven-eng:8080/nexus/service/local/repositories";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Where the Nexus instances live and how to talk to them. Built once in `main` and handed to
///  the repository and the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Nexus REST root of the public 'release' repositories
    pub release_base_uri: String,
    /// Nexus REST root of the internal 'eng' repositories
    pub eng_base_uri: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub credentials: Option<Credentials>,
}
impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            release_base_uri: DEFAULT_RELEASE_BASE_URI.to_string(),
            eng_base_uri: DEFAULT_ENG_BASE_URI.to_string(),
            user_agent: format!("getbuild/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            credentials: None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_password_is_not_logged() {
        let credentials = Credentials {
            username: "builder".to_string(),
            password: "secret".to_string(),
        };
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("builder"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_default_user_agent() {
        assert!(RepositoryConfig::default().user_agent.starts_with("getbuild/"));
    }
}
