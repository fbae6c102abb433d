//! Source loader for initializing adapters from configuration

use super::http_adapter::HttpAdapter;
use super::registry::SourceRegistry;
use super::traits::Source;
use super::{clinical_trials, fda, ncbi, news, sec, snomed};
use crate::config::{Settings, SourceConfig};
use crate::network::HttpClient;
use crate::search::SourceId;
use std::sync::Arc;
use tracing::{info, warn};

/// Loader for initializing sources from configuration
pub struct SourceLoader;

impl SourceLoader {
    /// Build a registry holding every enabled source.
    ///
    /// Sources with no entry in the settings run with defaults. A source
    /// that fails to initialize is logged and left out; requests for it
    /// then report it as unavailable.
    pub fn load(settings: &Settings, client: &HttpClient) -> SourceRegistry {
        let mut registry = SourceRegistry::new();

        for id in SourceId::ALL {
            let config = settings
                .get_source(id)
                .cloned()
                .unwrap_or_else(|| SourceConfig::new(id));

            if config.disabled {
                info!("Skipping disabled source: {}", id);
                continue;
            }

            match Self::create_source(id, &config) {
                Ok(source) => {
                    let timeout = source.timeout();
                    let adapter = HttpAdapter::new(source, client.clone());
                    info!("Loaded source: {} ({})", id, id.label());
                    registry.register_with_timeout(Arc::new(adapter), config, timeout);
                }
                Err(e) => {
                    warn!("Failed to load source {}: {}", id, e);
                }
            }
        }

        info!("Loaded {} sources", registry.len());
        registry
    }

    /// Create a source instance by id
    fn create_source(id: SourceId, config: &SourceConfig) -> anyhow::Result<Arc<dyn Source>> {
        let mut source: Box<dyn Source> = match id {
            SourceId::Fda => Box::new(fda::Fda::new()),
            SourceId::ClinicalTrials => Box::new(clinical_trials::ClinicalTrials::new()),
            SourceId::Ncbi => Box::new(ncbi::Ncbi::new()),
            SourceId::News => Box::new(news::News::new()),
            SourceId::Sec => Box::new(sec::Sec::new()),
            SourceId::Snomed => Box::new(snomed::Snomed::new()),
        };

        // Initialize the source
        source.init(config)?;

        // Validate configuration
        source.validate()?;

        let about = source.about();
        if about.require_api_key && config.api_key.is_none() {
            warn!("Source {} needs an API key; its requests will fail", id);
        }

        Ok(Arc::from(source))
    }
}
