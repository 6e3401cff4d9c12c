//! Glossary lookup for well-known terms mentioned in a query.

use serde::Serialize;

use crate::domain::models::GlossaryConfig;

/// A glossary term found in a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlossaryHit {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, Default)]
pub struct Glossary {
    /// (lowercased term, display term, definition)
    entries: Vec<(String, String, String)>,
}

impl Glossary {
    pub fn new<I, T, D>(entries: I) -> Self
    where
        I: IntoIterator<Item = (T, D)>,
        T: Into<String>,
        D: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(term, definition)| {
                let term = term.into();
                (term.to_lowercase(), term, definition.into())
            })
            .filter(|(needle, _, _)| !needle.trim().is_empty())
            .collect();
        Self { entries }
    }

    /// Build from configuration; a disabled glossary never matches.
    pub fn from_config(config: &GlossaryConfig) -> Self {
        if !config.enabled {
            return Self::default();
        }
        Self::new(config.entries.iter().map(|(t, d)| (t.as_str(), d.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every term contained in `query`, case-insensitively, in glossary order.
    pub fn lookup(&self, query: &str) -> Vec<GlossaryHit> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|(needle, _, _)| query.contains(needle.as_str()))
            .map(|(_, term, definition)| GlossaryHit {
                term: term.clone(),
                definition: definition.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_entries_match_case_insensitively() {
        let glossary = Glossary::from_config(&GlossaryConfig::default());
        let hits = glossary.lookup("How do GANs relate to entropy?");
        let terms: Vec<_> = hits.iter().map(|h| h.term.as_str()).collect();
        assert_eq!(terms, vec!["GAN", "entropy"]);
    }

    #[test]
    fn test_no_hits() {
        let glossary = Glossary::from_config(&GlossaryConfig::default());
        assert!(glossary.lookup("Tell me about Mars").is_empty());
    }

    #[test]
    fn test_disabled_glossary_is_empty() {
        let config = GlossaryConfig {
            enabled: false,
            ..GlossaryConfig::default()
        };
        let glossary = Glossary::from_config(&config);
        assert!(glossary.is_empty());
        assert!(glossary.lookup("what is a qubit").is_empty());
    }
}
