//! Source registry for managing available adapters

use super::traits::Adapter;
use crate::config::SourceConfig;
use crate::search::SourceId;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of the adapters available to the orchestrator
pub struct SourceRegistry {
    /// Adapters by source id
    adapters: HashMap<SourceId, Arc<dyn Adapter>>,
    /// Source configurations
    configs: HashMap<SourceId, SourceConfig>,
    /// Built-in default timeouts, used when the config has none
    default_timeouts: HashMap<SourceId, f64>,
}

impl SourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
            configs: HashMap::new(),
            default_timeouts: HashMap::new(),
        }
    }

    /// Register an adapter
    pub fn register(&mut self, adapter: Arc<dyn Adapter>, config: SourceConfig) {
        let id = adapter.id();
        self.adapters.insert(id, adapter);
        self.configs.insert(id, config);
    }

    /// Register an adapter along with the source's own default timeout
    pub fn register_with_timeout(
        &mut self,
        adapter: Arc<dyn Adapter>,
        config: SourceConfig,
        timeout: f64,
    ) {
        self.default_timeouts.insert(adapter.id(), timeout);
        self.register(adapter, config);
    }

    /// Get an adapter by id
    pub fn get(&self, id: SourceId) -> Option<&Arc<dyn Adapter>> {
        self.adapters.get(&id)
    }

    /// Registered source ids, in display order
    pub fn ids(&self) -> Vec<SourceId> {
        SourceId::ALL
            .into_iter()
            .filter(|id| self.adapters.contains_key(id))
            .collect()
    }

    /// Get number of registered sources
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Get effective timeout for a source in seconds
    pub fn get_timeout(&self, id: SourceId, default: f64) -> f64 {
        self.configs
            .get(&id)
            .and_then(|c| c.timeout)
            .or_else(|| self.default_timeouts.get(&id).copied())
            .unwrap_or(default)
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::SourceResult;
    use crate::search::Query;
    use async_trait::async_trait;

    struct Dummy(SourceId);

    #[async_trait]
    impl Adapter for Dummy {
        fn id(&self) -> SourceId {
            self.0
        }

        async fn fetch(&self, _query: &Query) -> SourceResult {
            SourceResult::ok(self.0, vec![])
        }
    }

    #[test]
    fn test_registry() {
        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(Dummy(SourceId::Sec)), SourceConfig::new(SourceId::Sec));
        registry.register(Arc::new(Dummy(SourceId::Fda)), SourceConfig::new(SourceId::Fda));

        assert!(registry.get(SourceId::Fda).is_some());
        assert!(registry.get(SourceId::News).is_none());
        assert_eq!(registry.ids(), vec![SourceId::Fda, SourceId::Sec]);
    }

    #[test]
    fn test_timeout_precedence() {
        let mut registry = SourceRegistry::new();
        let mut config = SourceConfig::new(SourceId::Fda);
        config.timeout = Some(3.0);
        registry.register_with_timeout(Arc::new(Dummy(SourceId::Fda)), config, 12.0);
        registry.register_with_timeout(
            Arc::new(Dummy(SourceId::Ncbi)),
            SourceConfig::new(SourceId::Ncbi),
            12.0,
        );
        registry.register(Arc::new(Dummy(SourceId::Sec)), SourceConfig::new(SourceId::Sec));

        assert_eq!(registry.get_timeout(SourceId::Fda, 20.0), 3.0);
        assert_eq!(registry.get_timeout(SourceId::Ncbi, 20.0), 12.0);
        assert_eq!(registry.get_timeout(SourceId::Sec, 20.0), 20.0);
    }
}
