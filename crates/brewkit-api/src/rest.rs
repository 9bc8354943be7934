// REST document store client
//
// Wraps `reqwest::Client` with collection/document URL construction and
// status mapping. Live queries go through the WebSocket loop in `live`.

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::document::{Document, Fields, ListenQuery};
use crate::error::Error;
use crate::gateway::{Gateway, LiveQuery};
use crate::live::{self, ReconnectConfig};
use crate::transport::{GatewayConfig, live_url_from};

/// `GET .../documents` response body.
#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<Document>,
}

/// `PUT .../documents/{id}` request body.
#[derive(Debug, Serialize)]
struct DocumentWrite<'a> {
    fields: &'a Fields,
}

/// HTTP + WebSocket client for the document store.
#[derive(Debug, Clone)]
pub struct RestGateway {
    http: reqwest::Client,
    base_url: Url,
    live_url: Url,
    reconnect: ReconnectConfig,
}

impl RestGateway {
    /// Create a gateway from connection settings.
    pub fn new(config: &GatewayConfig) -> Result<Self, Error> {
        Ok(Self {
            http: config.build_client()?,
            base_url: config.url.clone(),
            live_url: config.resolved_live_url()?,
            reconnect: config.reconnect.clone(),
        })
    }

    /// Create a gateway around a pre-built `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url: Url = base_url.parse()?;
        let live_url = live_url_from(&base_url)?;
        Ok(Self {
            http,
            base_url,
            live_url,
            reconnect: ReconnectConfig::default(),
        })
    }

    /// The REST base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The live-query base URL.
    pub fn live_url(&self) -> &Url {
        &self.live_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/collections/{collection}/documents`
    fn documents_url(&self, collection: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!(
            "{base}/collections/{collection}/documents"
        ))?)
    }

    /// `{base}/collections/{collection}/documents/{id}`
    fn document_url(&self, collection: &str, id: &str) -> Result<Url, Error> {
        let mut url = self.documents_url(collection)?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(id);
        Ok(url)
    }

    // ── Response handling ────────────────────────────────────────────

    /// Map non-success statuses onto typed errors.
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let path = resp.url().path().to_owned();
        let body = resp.text().await.unwrap_or_default();
        let message = body.chars().take(200).collect::<String>();

        Err(match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Error::PermissionDenied {
                    message: if message.is_empty() {
                        format!("HTTP {status}")
                    } else {
                        message
                    },
                }
            }
            reqwest::StatusCode::NOT_FOUND => Error::NotFound { path },
            _ => Error::Status {
                status: status.as_u16(),
                message,
            },
        })
    }
}

impl Gateway for RestGateway {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, Error> {
        let url = self.documents_url(collection)?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        let resp = Self::check_status(resp).await?;
        let body = resp.text().await?;

        let list: DocumentList = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        debug!(collection, count = list.documents.len(), "listed documents");
        Ok(list.documents)
    }

    async fn set_document(&self, collection: &str, id: &str, fields: Fields) -> Result<(), Error> {
        let url = self.document_url(collection, id)?;
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .json(&DocumentWrite { fields: &fields })
            .send()
            .await?;
        Self::check_status(resp).await?;
        Ok(())
    }

    async fn listen(&self, query: ListenQuery) -> Result<LiveQuery, Error> {
        let url = live::listen_url(&self.live_url, &query)?;
        Ok(live::spawn_live_query(url, self.reconnect.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn document_url_escapes_id() {
        let gw = RestGateway::from_reqwest("http://localhost:8080/v1/", reqwest::Client::new())
            .unwrap();
        let url = gw.document_url("beverages", "a b/c").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v1/collections/beverages/documents/a%20b%2Fc"
        );
    }

    #[test]
    fn live_url_is_derived_from_base() {
        let gw = RestGateway::from_reqwest("https://store.example.com/v1", reqwest::Client::new())
            .unwrap();
        assert_eq!(gw.live_url().scheme(), "wss");
    }
}
