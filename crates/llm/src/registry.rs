use crate::adapters::AdapterKind;
use crate::provider::{Endpoint, ProviderDescriptor, ProviderId, UnknownProvider};

/// Immutable table of provider descriptors, in display order.
///
/// Built once at startup and shared by reference; tests build their own with
/// [`ProviderRegistry::from_descriptors`].
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<ProviderDescriptor>,
}

impl ProviderRegistry {
    /// The five built-in providers with their default models.
    pub fn builtin() -> Self {
        Self {
            providers: ProviderId::ALL.into_iter().map(builtin_descriptor).collect(),
        }
    }

    /// Built-in providers with model overrides taken from the environment
    /// (`OPENAI_MODEL`, `ANTHROPIC_MODEL`, ...).
    pub fn from_env() -> Self {
        Self::builtin().with_model_overrides(|name| std::env::var(name).ok())
    }

    pub fn with_model_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        for descriptor in &mut self.providers {
            if let Some(model) = lookup(descriptor.model_env) {
                let model = model.trim();
                if !model.is_empty() {
                    descriptor.model = model.to_string();
                }
            }
        }
        self
    }

    /// Later duplicates of an id are ignored.
    pub fn from_descriptors(descriptors: Vec<ProviderDescriptor>) -> Self {
        let mut providers: Vec<ProviderDescriptor> = Vec::with_capacity(descriptors.len());
        for d in descriptors {
            if !providers.iter().any(|p| p.id == d.id) {
                providers.push(d);
            }
        }
        Self { providers }
    }

    pub fn get(&self, id: ProviderId) -> Option<&ProviderDescriptor> {
        self.providers.iter().find(|p| p.id == id)
    }

    /// Resolve a wire id. Ids that parse but are not registered are unknown too.
    pub fn lookup(&self, id: &str) -> Result<&ProviderDescriptor, UnknownProvider> {
        let parsed: ProviderId = id.parse()?;
        self.get(parsed).ok_or_else(|| UnknownProvider(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.iter()
    }

    pub fn ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Connection details for one built-in provider.
pub fn builtin_descriptor(id: ProviderId) -> ProviderDescriptor {
    match id {
        ProviderId::ChatGpt => ProviderDescriptor {
            id,
            display_name: "ChatGPT",
            model: "gpt-4o-mini".into(),
            credential: "OPENAI_API_KEY",
            model_env: "OPENAI_MODEL",
            endpoint: Endpoint::Static("https://api.openai.com/v1/chat/completions".into()),
            adapter: AdapterKind::OpenAiCompatible,
            color: "#10a37f",
            icon: "openai",
        },
        ProviderId::Claude => ProviderDescriptor {
            id,
            display_name: "Claude",
            model: "claude-3-5-sonnet-20241022".into(),
            credential: "ANTHROPIC_API_KEY",
            model_env: "ANTHROPIC_MODEL",
            endpoint: Endpoint::Static("https://api.anthropic.com/v1/messages".into()),
            adapter: AdapterKind::Anthropic,
            color: "#d97757",
            icon: "anthropic",
        },
        ProviderId::Gemini => ProviderDescriptor {
            id,
            display_name: "Gemini",
            model: "gemini-1.5-flash".into(),
            credential: "GEMINI_API_KEY",
            model_env: "GEMINI_MODEL",
            endpoint: Endpoint::KeyInQuery(
                "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent".into(),
            ),
            adapter: AdapterKind::Gemini,
            color: "#4285f4",
            icon: "google",
        },
        ProviderId::Grok => ProviderDescriptor {
            id,
            display_name: "Grok",
            model: "grok-beta".into(),
            credential: "XAI_API_KEY",
            model_env: "XAI_MODEL",
            endpoint: Endpoint::Static("https://api.x.ai/v1/chat/completions".into()),
            adapter: AdapterKind::OpenAiCompatible,
            color: "#1d1d1f",
            icon: "xai",
        },
        ProviderId::Perplexity => ProviderDescriptor {
            id,
            display_name: "Perplexity",
            model: "sonar".into(),
            credential: "PERPLEXITY_API_KEY",
            model_env: "PERPLEXITY_MODEL",
            endpoint: Endpoint::Static("https://api.perplexity.ai/chat/completions".into()),
            adapter: AdapterKind::OpenAiCompatible,
            color: "#20808d",
            icon: "perplexity",
        },
    }
}
