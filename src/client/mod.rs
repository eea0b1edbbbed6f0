//! Remote sync client for the provenance store's REST API

mod queries;
mod transport;

pub use queries::{partition_simulation, SimulationDetails};
pub use transport::{HttpRequest, HttpResponse, Method, MockTransport, ReqwestTransport, Transport};

use crate::builder::TraceMessageBuilder;
use crate::codec::{self, DecodedGraph};
use crate::config::TraceConfig;
use crate::environment::ProjectContext;
use crate::error::{TraceError, TraceResult};
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

const ACCEPT: &str = "application/ld+json, application/json";
const JSON_LD: &str = "application/ld+json";
const OSLC_CORE_VERSION: &str = "3.0";

/// Talks to the store on behalf of one project
#[derive(Clone)]
pub struct TraceClient {
    base: Url,
    oslc: bool,
    project: ProjectContext,
    transport: Arc<dyn Transport>,
}

impl TraceClient {
    pub fn new(config: &TraceConfig, project: ProjectContext, transport: Arc<dyn Transport>) -> TraceResult<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| TraceError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(TraceError::InvalidUrl(config.base_url.clone()));
        }
        Ok(Self {
            base,
            oslc: config.oslc_core_version,
            project,
            transport,
        })
    }

    /// Client over real HTTP
    pub fn from_config(config: &TraceConfig, project: ProjectContext) -> TraceResult<Self> {
        Self::new(config, project, Arc::new(ReqwestTransport::new()))
    }

    pub fn project(&self) -> &ProjectContext {
        &self.project
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve path segments and query pairs against the base URL. Each
    /// segment is percent-encoded on its own, so URIs can be segments.
    pub fn url(&self, segments: &[&str], params: &[(&str, &str)]) -> TraceResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| TraceError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    fn headers(&self, extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = extra
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if self.oslc {
            headers.push(("OSLC-Core-Version".into(), OSLC_CORE_VERSION.into()));
        }
        headers
    }

    /// GET and decode. Any status outside 200–399 is an error.
    pub async fn get(&self, segments: &[&str], params: &[(&str, &str)]) -> TraceResult<DecodedGraph> {
        let url = self.url(segments, params)?;
        debug!(url = %url, "GET");
        let request = HttpRequest {
            method: Method::Get,
            url: url.clone(),
            headers: self.headers(&[("Accept", ACCEPT)]),
            body: None,
        };

        let response = self.transport.send(request).await?;
        if !(200..400).contains(&response.status) {
            return Err(TraceError::Status {
                status: response.status,
                url: url.to_string(),
            });
        }
        codec::parse_objects(&response.body, &response.content_type)
    }

    /// POST a JSON-LD document. Anything but 2xx is an error.
    pub async fn post(&self, segments: &[&str], doc: &Value) -> TraceResult<()> {
        let url = self.url(segments, &[])?;
        debug!(url = %url, "POST");
        let request = HttpRequest {
            method: Method::Post,
            url: url.clone(),
            headers: self.headers(&[("Content-Type", JSON_LD), ("Accept", ACCEPT)]),
            body: Some(serde_json::to_string(doc)?),
        };

        let response = self.transport.send(request).await?;
        if !(200..300).contains(&response.status) {
            return Err(TraceError::Status {
                status: response.status,
                url: url.to_string(),
            });
        }
        Ok(())
    }

    /// Encode the builder's triples and send them to `push`
    pub async fn push(&self, builder: &TraceMessageBuilder) -> TraceResult<()> {
        let doc = builder.finish()?;
        self.post(&["push"], &doc).await?;
        info!(project = %self.project.id, triples = builder.len(), "trace message pushed");
        Ok(())
    }
}
