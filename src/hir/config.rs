//! Analysis configuration.

/// Tunables shared by every analysis snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Maximum number of parent/alias/extends hops before a chain is
    /// treated as broken.
    pub max_chain_hops: usize,
    /// Service tags that declare event listeners.
    pub event_listener_tags: Vec<String>,
    /// Interface a class implements to subscribe via `getSubscribedEvents`.
    pub subscriber_interface: String,
    /// Base class of console commands.
    pub command_base_class: String,
    /// Separator used when a stub parameter accepts several types.
    pub union_separator: String,
    /// Parameter name used in generated method stubs.
    pub stub_parameter_name: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_chain_hops: 64,
            event_listener_tags: vec!["kernel.event_listener".to_string()],
            subscriber_interface: "Symfony\\Component\\EventDispatcher\\EventSubscriberInterface"
                .to_string(),
            command_base_class: "Symfony\\Component\\Console\\Command\\Command".to_string(),
            union_separator: "|".to_string(),
            stub_parameter_name: "$event".to_string(),
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_chain_hops(mut self, hops: usize) -> Self {
        self.max_chain_hops = hops;
        self
    }

    pub fn with_event_listener_tag(mut self, tag: impl Into<String>) -> Self {
        self.event_listener_tags.push(tag.into());
        self
    }

    pub fn with_union_separator(mut self, separator: impl Into<String>) -> Self {
        self.union_separator = separator.into();
        self
    }

    pub fn with_stub_parameter_name(mut self, name: impl Into<String>) -> Self {
        self.stub_parameter_name = name.into();
        self
    }

    pub fn is_listener_tag(&self, tag: &str) -> bool {
        self.event_listener_tags.iter().any(|t| t == tag)
    }
}
