use crate::{COROS_URL, CorosError};
use secrecy::SecretString;

/// Credentials and endpoint for a session.
#[derive(Clone, Debug)]
pub struct Config {
    pub account: String,
    /// MD5 hex digest of the account password. Hashing happens upstream.
    pub password_hash: SecretString,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, CorosError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, CorosError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let account = get("COROS_ACCOUNT")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CorosError::Config("COROS_ACCOUNT missing".into()))?;
        let password_hash = get("COROS_PASSWORD_MD5")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CorosError::Config("COROS_PASSWORD_MD5 missing".into()))?;
        let base_url = get("COROS_BASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| COROS_URL.into());
        Ok(Self {
            account,
            password_hash: SecretString::new(password_hash.into()),
            base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn from_env_missing_password_hash() {
        let get = |k: &str| match k {
            "COROS_ACCOUNT" => Some("user@x.com".into()),
            _ => None,
        };
        let res = Config::from_env_with(get);
        assert!(matches!(res, Err(CorosError::Config(msg)) if msg.contains("COROS_PASSWORD_MD5")));
    }

    #[test]
    fn from_env_rejects_empty_account() {
        let get = |k: &str| match k {
            "COROS_ACCOUNT" => Some(String::new()),
            "COROS_PASSWORD_MD5" => Some("5f4dcc3b5aa765d61d8327deb882cf99".into()),
            _ => None,
        };
        assert!(Config::from_env_with(get).is_err());
    }

    #[test]
    fn from_env_defaults_base_url() {
        let get = |k: &str| match k {
            "COROS_ACCOUNT" => Some("user@x.com".into()),
            "COROS_PASSWORD_MD5" => Some("5f4dcc3b5aa765d61d8327deb882cf99".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.account, "user@x.com");
        assert_eq!(cfg.base_url, COROS_URL);
        assert_eq!(
            cfg.password_hash.expose_secret(),
            "5f4dcc3b5aa765d61d8327deb882cf99"
        );
    }

    #[test]
    fn from_env_empty_base_url_falls_back_to_default() {
        let get = |k: &str| match k {
            "COROS_ACCOUNT" => Some("user@x.com".into()),
            "COROS_PASSWORD_MD5" => Some("hash".into()),
            "COROS_BASE_URL" => Some(String::new()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.base_url, COROS_URL);
    }

    #[test]
    fn from_env_reads_base_url_override() {
        let get = |k: &str| match k {
            "COROS_ACCOUNT" => Some("user@x.com".into()),
            "COROS_PASSWORD_MD5" => Some("hash".into()),
            "COROS_BASE_URL" => Some("http://localhost:9000".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.base_url, "http://localhost:9000");
    }
}
