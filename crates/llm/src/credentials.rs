use std::collections::HashMap;
use std::fmt;

use crate::registry::ProviderRegistry;

/// Process-wide API keys, keyed by environment variable name.
#[derive(Clone, Default)]
pub struct Credentials {
    values: HashMap<String, String>,
}

impl Credentials {
    /// Read every credential the registry names from the environment.
    pub fn from_env(registry: &ProviderRegistry) -> Self {
        Self::from_lookup(registry, |name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(registry: &ProviderRegistry, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut creds = Self::default();
        for descriptor in registry.iter() {
            if let Some(value) = lookup(descriptor.credential) {
                creds = creds.with(descriptor.credential, value);
            }
        }
        creds
    }

    pub fn with<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.values.insert(name.into(), trimmed.to_string());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_configured(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort();
        f.debug_struct("Credentials").field("configured", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_count_as_missing() {
        let creds = Credentials::default().with("OPENAI_API_KEY", "  ").with("XAI_API_KEY", "k");
        assert_eq!(creds.get("OPENAI_API_KEY"), None);
        assert_eq!(creds.get("XAI_API_KEY"), Some("k"));
    }

    #[test]
    fn lookup_only_reads_registered_names() {
        let reg = ProviderRegistry::builtin();
        let creds = Credentials::from_lookup(&reg, |name| {
            (name == "ANTHROPIC_API_KEY").then(|| "sk-ant".to_string())
        });
        assert!(creds.is_configured("ANTHROPIC_API_KEY"));
        assert!(!creds.is_configured("OPENAI_API_KEY"));
    }

    #[test]
    fn debug_output_hides_values() {
        let creds = Credentials::default().with("OPENAI_API_KEY", "sk-very-secret");
        let shown = format!("{:?}", creds);
        assert!(shown.contains("OPENAI_API_KEY"));
        assert!(!shown.contains("sk-very-secret"));
    }
}
