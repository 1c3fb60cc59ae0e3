//! Adapter configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::MessageKind;

/// Which messages the adapter accepts, and how it shapes responses.
///
/// ```rust
/// use schemashim_adapter::{AdapterConfig, MessageKind};
///
/// let config: AdapterConfig =
///     serde_json::from_str(r#"{"messages": ["Retrieve", "RetrieveMultiple"]}"#).unwrap();
///
/// assert!(config.is_enabled(MessageKind::Retrieve));
/// assert!(!config.is_enabled(MessageKind::Delete));
/// assert!(config.project_retrieve);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Enabled message kinds. Anything else is rejected as unsupported.
    pub messages: BTreeSet<MessageKind>,
    /// Trim Retrieve results to the requested columns.
    pub project_retrieve: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            messages: MessageKind::ALL.into_iter().collect(),
            project_retrieve: true,
        }
    }
}

impl AdapterConfig {
    /// A read-only configuration: Retrieve and RetrieveMultiple.
    pub fn read_only() -> Self {
        Self::default().with_messages([MessageKind::Retrieve, MessageKind::RetrieveMultiple])
    }

    pub fn with_messages(mut self, messages: impl IntoIterator<Item = MessageKind>) -> Self {
        self.messages = messages.into_iter().collect();
        self
    }

    pub fn with_project_retrieve(mut self, project_retrieve: bool) -> Self {
        self.project_retrieve = project_retrieve;
        self
    }

    pub fn is_enabled(&self, kind: MessageKind) -> bool {
        self.messages.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_everything() {
        let config = AdapterConfig::default();
        for kind in MessageKind::ALL {
            assert!(config.is_enabled(kind));
        }
        assert!(config.project_retrieve);
    }

    #[test]
    fn read_only() {
        let config = AdapterConfig::read_only();
        assert!(config.is_enabled(MessageKind::RetrieveMultiple));
        assert!(!config.is_enabled(MessageKind::Create));
        assert!(!config.is_enabled(MessageKind::Update));
    }

    #[test]
    fn empty_json_is_default() {
        let config: AdapterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AdapterConfig::default());
    }
}
