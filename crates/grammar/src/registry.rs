use std::collections::HashMap;

use tracing::debug;

use common::{Error, Parsed, Result};

use crate::config::ProviderFileConfig;
use crate::providers::catalogue;
use crate::Grammar;

/// Maps provider tags to their grammar. Built once, read-only afterwards.
pub struct GrammarRegistry {
    grammars: HashMap<String, Box<dyn Grammar>>,
}

impl GrammarRegistry {
    /// Registry with every built-in grammar and its default settings.
    pub fn builtin() -> Self {
        let grammars = catalogue()
            .into_iter()
            .map(|grammar| {
                debug!(tag = %grammar.tag(), "Registered grammar");
                (grammar.tag().to_string(), grammar)
            })
            .collect();
        Self { grammars }
    }

    /// Built-in registry with per-provider overrides applied.
    ///
    /// An override naming a tag with no grammar is a config error.
    pub fn from_config(file_cfg: &ProviderFileConfig) -> Result<Self> {
        let mut registry = Self::builtin();
        for overrides in &file_cfg.providers {
            let grammar = registry.grammars.get_mut(&overrides.tag).ok_or_else(|| {
                Error::Config(format!("override for unknown provider '{}'", overrides.tag))
            })?;
            grammar.configure(overrides);
            debug!(
                tag = %overrides.tag,
                leverage = ?overrides.leverage,
                risk_factor = ?overrides.risk_factor,
                target_cap = ?overrides.target_cap,
                "Applied provider override"
            );
        }
        Ok(registry)
    }

    pub fn lookup(&self, tag: &str) -> Result<&dyn Grammar> {
        self.grammars
            .get(tag)
            .map(|grammar| grammar.as_ref())
            .ok_or_else(|| Error::UnknownTag(tag.to_string()))
    }

    /// Parse `text` with the grammar registered for `tag`.
    pub fn parse(&self, tag: &str, text: &str) -> Result<Parsed> {
        let parsed = self.lookup(tag)?.parse(text);
        if let Err(Error::InvalidSignal(reason)) = &parsed {
            debug!(tag, %reason, "Message rejected");
        }
        parsed
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.grammars.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }
}
