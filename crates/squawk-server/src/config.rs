use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use squawk_db::TallyPolicy;

/// Placeholder secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub session_days: i64,
    pub admin_password: String,
    pub tally_policy: TallyPolicy,
    /// External generation service; the built-in Markov generator is used when unset.
    pub generator_url: Option<String>,
    pub generator_seed: Option<u64>,
}

impl Config {
    /// Read configuration from the environment (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = var("SQUAWK_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("SQUAWK_JWT_SECRET is unset or still a placeholder");
        }

        let port: u16 = var("SQUAWK_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("Invalid SQUAWK_PORT")?;

        let session_days: i64 = var("SQUAWK_SESSION_DAYS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .context("Invalid SQUAWK_SESSION_DAYS")?;

        let tally_policy = var("SQUAWK_TALLY_POLICY")
            .map(|p| p.parse::<TallyPolicy>())
            .transpose()?
            .unwrap_or_default();

        let generator_seed = var("SQUAWK_GENERATOR_SEED")
            .map(|s| s.parse::<u64>().context("Invalid SQUAWK_GENERATOR_SEED"))
            .transpose()?;

        Ok(Self {
            host: var("SQUAWK_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: var("SQUAWK_DB_PATH").unwrap_or_else(|| "squawk.db".into()).into(),
            jwt_secret,
            session_days,
            admin_password: var("SQUAWK_ADMIN_PASSWORD").unwrap_or_else(|| "admin".into()),
            tally_policy,
            generator_url: var("SQUAWK_GENERATOR_URL").filter(|u| !u.trim().is_empty()),
            generator_seed,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[("SQUAWK_JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.server_address(), "0.0.0.0:3000");
        assert_eq!(config.db_path, PathBuf::from("squawk.db"));
        assert_eq!(config.session_days, 30);
        assert_eq!(config.admin_password, "admin");
        assert_eq!(config.tally_policy, TallyPolicy::Incremental);
        assert!(config.generator_url.is_none());
        assert!(config.generator_seed.is_none());
    }

    #[test]
    fn placeholder_secret_is_refused() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("SQUAWK_JWT_SECRET", "dev-secret-change-me")])).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("SQUAWK_JWT_SECRET", "s3cret"),
            ("SQUAWK_PORT", "8081"),
            ("SQUAWK_TALLY_POLICY", "eager"),
            ("SQUAWK_GENERATOR_URL", "http://localhost:5000/generate"),
            ("SQUAWK_GENERATOR_SEED", "42"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.tally_policy, TallyPolicy::Eager);
        assert_eq!(config.generator_url.as_deref(), Some("http://localhost:5000/generate"));
        assert_eq!(config.generator_seed, Some(42));
    }

    #[test]
    fn bad_values_are_errors() {
        let secret = ("SQUAWK_JWT_SECRET", "s3cret");
        assert!(Config::from_lookup(lookup(&[secret, ("SQUAWK_PORT", "http")])).is_err());
        assert!(Config::from_lookup(lookup(&[secret, ("SQUAWK_TALLY_POLICY", "lazy")])).is_err());
    }
}
