//! Adapter that drives an HTTP [`Source`] through the shared client

use super::traits::{Adapter, Source, SourceStep};
use crate::error::SourceError;
use crate::network::HttpClient;
use crate::results::{Record, SourceResult};
use crate::search::{Query, SourceId};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Upper bound on requests per fetch; only NCBI needs the second one
const MAX_REQUESTS_PER_FETCH: usize = 2;

/// Binds a [`Source`] to the HTTP client. No retries: any failure is final
/// for this source for this request.
pub struct HttpAdapter {
    source: Arc<dyn Source>,
    client: HttpClient,
}

impl HttpAdapter {
    pub fn new(source: Arc<dyn Source>, client: HttpClient) -> Self {
        Self { source, client }
    }

    async fn run(&self, query: &Query) -> anyhow::Result<Vec<Record>> {
        let mut request = self.source.request(query)?;

        for _ in 0..MAX_REQUESTS_PER_FETCH {
            debug!("{} -> {}", self.source.id(), request.url);
            let response = self.client.execute(request).await?;
            match self.source.response(query, response)? {
                SourceStep::Done(records) => return Ok(records),
                SourceStep::FollowUp(next) => request = next,
            }
        }

        Err(SourceError::Parse("provider asked for too many follow-up requests".into()).into())
    }
}

#[async_trait]
impl Adapter for HttpAdapter {
    fn id(&self) -> SourceId {
        self.source.id()
    }

    async fn fetch(&self, query: &Query) -> SourceResult {
        let id = self.source.id();
        match self.run(query).await {
            Ok(records) => SourceResult::ok(id, records),
            Err(e) => {
                let error = SourceError::classify(&e);
                warn!("Source {} failed: {} ({:#})", id, error, e);
                SourceResult::from_error(id, &error)
            }
        }
    }
}
