use crate::cache::TableCache;
use crate::config::{Config, CredentialProvider};
use crate::endpoints::{Endpoint, EndpointRole, endpoints};
use crate::fetch::{AuthPolicy, fetch_table};
use crate::table::ResultTable;
use std::{sync::Arc, time::Duration};
use tracing::warn;

/// One widget's worth of data: the table and, when the fetch failed, why.
#[derive(Debug, Clone)]
pub struct Panel {
    pub endpoint: Endpoint,
    pub table: Arc<ResultTable>,
    pub error: Option<String>,
}

/// The fetch-cache-render loop over the five endpoints.
pub struct Dashboard {
    endpoints: Vec<Endpoint>,
    cache: Arc<TableCache>,
    client: reqwest::Client,
    credentials: Arc<dyn CredentialProvider>,
    auth: AuthPolicy,
    ttl: Duration,
}

impl Dashboard {
    pub fn new(
        config: &Config,
        cache: Arc<TableCache>,
        client: reqwest::Client,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            endpoints: endpoints(&config.api_base),
            cache,
            client,
            credentials,
            auth: AuthPolicy::from_flag(config.send_auth),
            ttl: config.cache_ttl,
        }
    }

    /// Points one role at a different URL, e.g. a self-hosted pipe.
    pub fn with_endpoint_url(mut self, role: EndpointRole, url: impl Into<String>) -> Self {
        if let Some(endpoint) = self.endpoints.iter_mut().find(|endpoint| endpoint.role == role) {
            endpoint.url = url.into();
        }
        self
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn endpoint(&self, role: EndpointRole) -> Option<&Endpoint> {
        self.endpoints.iter().find(|endpoint| endpoint.role == role)
    }

    /// Cached table for `endpoint` if fresh, else a new fetch. Failures
    /// become an empty table plus a message and are never cached.
    pub async fn obtain(&self, endpoint: &Endpoint) -> Panel {
        let result = self
            .cache
            .get_or_fetch(endpoint.role.key(), self.ttl, || {
                fetch_table(&self.client, endpoint, self.auth, self.credentials.as_ref())
            })
            .await;

        match result {
            Ok(table) => Panel {
                endpoint: endpoint.clone(),
                table,
                error: None,
            },
            Err(err) => {
                warn!(endpoint = %endpoint.role, url = %endpoint.url, "fetch failed: {err}");
                Panel {
                    endpoint: endpoint.clone(),
                    table: Arc::new(ResultTable::empty()),
                    error: Some(format!("Failed to load data: {err}")),
                }
            }
        }
    }

    /// Obtains every endpoint in page order, one after another.
    pub async fn render_pass(&self) -> Vec<Panel> {
        let mut panels = Vec::with_capacity(self.endpoints.len());
        for endpoint in &self.endpoints {
            panels.push(self.obtain(endpoint).await);
        }
        panels
    }

    /// Drops every cached table so the next pass refetches all endpoints.
    pub async fn refresh(&self) {
        self.cache.clear().await;
    }
}
