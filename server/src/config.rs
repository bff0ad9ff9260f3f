use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Process settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub provider_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            provider_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| DEFAULT_PORT.to_string())
            .trim()
            .parse()
            .context("PORT must be a port number")?;
        let timeout_secs: u64 = lookup("PROVIDER_TIMEOUT_SECS")
            .unwrap_or_else(|| DEFAULT_TIMEOUT_SECS.to_string())
            .trim()
            .parse()
            .context("PROVIDER_TIMEOUT_SECS must be a whole number of seconds")?;
        if timeout_secs == 0 {
            anyhow::bail!("PROVIDER_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self { port, provider_timeout: Duration::from_secs(timeout_secs) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.port, 3000);
        assert_eq!(s.provider_timeout, Duration::from_secs(60));
    }

    #[test]
    fn reads_overrides() {
        let s = Settings::from_lookup(lookup(&[("PORT", "8080"), ("PROVIDER_TIMEOUT_SECS", " 15 ")])).unwrap();
        assert_eq!(s.port, 8080);
        assert_eq!(s.provider_timeout, Duration::from_secs(15));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Settings::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("PROVIDER_TIMEOUT_SECS", "0")])).is_err());
    }
}
