// Hand-crafted async HTTP client for the Cirrus cloud REST API.
//
// Base path: /v4/
// Auth: `Authorization: Bearer <token>` header

use std::future::Future;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::auth::Credentials;
use crate::transport::TransportConfig;
use crate::types::{self, ErrorEnvelope, Page};

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Cirrus v4 API.
///
/// Uses bearer-token authentication and communicates via JSON REST
/// endpoints under `/v4/`.
#[derive(Debug, Clone)]
pub struct CloudClient {
    http: reqwest::Client,
    base_url: Url,
    page_size: u32,
}

/// The four collections the search view fetches together.
#[derive(Debug, Clone, Default)]
pub struct EntityBundle {
    pub servers: Vec<types::ServerResponse>,
    pub load_balancers: Vec<types::LoadBalancerResponse>,
    pub volumes: Vec<types::VolumeResponse>,
    pub domains: Vec<types::DomainResponse>,
}

impl CloudClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from credentials and transport config.
    ///
    /// Injects `Authorization` as a default header on every request when
    /// a token is present.
    pub fn new(
        base_url: &str,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(value) = credentials.authorization_header()? {
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = transport.build_client_with_headers(headers)?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Override the page size used by the `get_all_*` helpers.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the base URL so it always ends with `/v4/`.
    ///
    /// `https://api.example.com` and `https://api.example.com/v4` both
    /// become `https://api.example.com/v4/`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;

        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/v4") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/v4/"));
        }

        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"servers"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(path, resp).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(path, resp).await
    }

    /// POST an empty JSON object and discard the response body.
    async fn post_empty(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        self.handle_empty(path, resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        path: &str,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(path, status, resp).await)
        }
    }

    async fn handle_empty(&self, path: &str, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(path, status, resp).await)
        }
    }

    async fn parse_error(path: &str, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        match status {
            reqwest::StatusCode::UNAUTHORIZED => return Error::InvalidToken,
            reqwest::StatusCode::FORBIDDEN => {
                return Error::Forbidden {
                    path: path.to_owned(),
                };
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = resp
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(5);
                return Error::RateLimited { retry_after_secs };
            }
            _ => {}
        }

        let raw = resp.text().await.unwrap_or_default();

        match serde_json::from_str::<ErrorEnvelope>(&raw) {
            Ok(envelope) if !envelope.errors.is_empty() => {
                let field = envelope.errors.iter().find_map(|e| e.field.clone());
                let message = envelope
                    .errors
                    .into_iter()
                    .map(|e| e.reason)
                    .collect::<Vec<_>>()
                    .join("; ");
                Error::Api {
                    message,
                    field,
                    status: status.as_u16(),
                }
            }
            _ => Error::Api {
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                field: None,
                status: status.as_u16(),
            },
        }
    }

    // ── Pagination helper ────────────────────────────────────────────

    /// Collect all pages into a single `Vec<T>`.
    ///
    /// Pages are 1-based; the walk stops at the server-reported page count
    /// or at the first empty page, whichever comes first.
    pub async fn paginate_all<T, F, Fut>(&self, fetch: F) -> Result<Vec<T>, Error>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = Result<Page<T>, Error>>,
    {
        let mut all = Vec::new();
        let mut page_no: u32 = 1;

        loop {
            let page = fetch(page_no).await?;
            let received = page.data.len();
            all.extend(page.data);

            if received == 0 || page_no >= page.pages {
                break;
            }
            page_no += 1;
        }

        Ok(all)
    }

    fn page_params(&self, page: u32) -> [(&'static str, String); 2] {
        [
            ("page", page.to_string()),
            ("page_size", self.page_size.to_string()),
        ]
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Servers ──────────────────────────────────────────────────────

    pub async fn list_servers(&self, page: u32) -> Result<Page<types::ServerResponse>, Error> {
        self.get_with_params("servers", &self.page_params(page))
            .await
    }

    pub async fn get_all_servers(&self) -> Result<Vec<types::ServerResponse>, Error> {
        self.paginate_all(|p| self.list_servers(p)).await
    }

    pub async fn get_server(&self, id: u64) -> Result<types::ServerResponse, Error> {
        self.get(&format!("servers/{id}")).await
    }

    pub async fn boot_server(&self, id: u64) -> Result<(), Error> {
        self.post_empty(&format!("servers/{id}/boot")).await
    }

    pub async fn reboot_server(&self, id: u64) -> Result<(), Error> {
        self.post_empty(&format!("servers/{id}/reboot")).await
    }

    pub async fn shutdown_server(&self, id: u64) -> Result<(), Error> {
        self.post_empty(&format!("servers/{id}/shutdown")).await
    }

    /// Enter the migration queue for a server with a pending or scheduled
    /// migration.
    pub async fn migrate_server(&self, id: u64) -> Result<(), Error> {
        self.post_empty(&format!("servers/{id}/migrate")).await
    }

    // ── Server types ─────────────────────────────────────────────────

    pub async fn list_server_types(
        &self,
        page: u32,
    ) -> Result<Page<types::ServerTypeResponse>, Error> {
        self.get_with_params("server-types", &self.page_params(page))
            .await
    }

    pub async fn get_all_server_types(&self) -> Result<Vec<types::ServerTypeResponse>, Error> {
        self.paginate_all(|p| self.list_server_types(p)).await
    }

    // ── Volumes ──────────────────────────────────────────────────────

    pub async fn list_volumes(&self, page: u32) -> Result<Page<types::VolumeResponse>, Error> {
        self.get_with_params("volumes", &self.page_params(page))
            .await
    }

    pub async fn get_all_volumes(&self) -> Result<Vec<types::VolumeResponse>, Error> {
        self.paginate_all(|p| self.list_volumes(p)).await
    }

    // ── Domains ──────────────────────────────────────────────────────

    pub async fn list_domains(&self, page: u32) -> Result<Page<types::DomainResponse>, Error> {
        self.get_with_params("domains", &self.page_params(page))
            .await
    }

    pub async fn get_all_domains(&self) -> Result<Vec<types::DomainResponse>, Error> {
        self.paginate_all(|p| self.list_domains(p)).await
    }

    // ── Load balancers ───────────────────────────────────────────────

    pub async fn list_load_balancers(
        &self,
        page: u32,
    ) -> Result<Page<types::LoadBalancerResponse>, Error> {
        self.get_with_params("load-balancers", &self.page_params(page))
            .await
    }

    pub async fn get_all_load_balancers(
        &self,
    ) -> Result<Vec<types::LoadBalancerResponse>, Error> {
        self.paginate_all(|p| self.list_load_balancers(p)).await
    }

    // ── Images ───────────────────────────────────────────────────────

    pub async fn list_images(&self, page: u32) -> Result<Page<types::ImageResponse>, Error> {
        self.get_with_params("images", &self.page_params(page))
            .await
    }

    pub async fn get_all_images(&self) -> Result<Vec<types::ImageResponse>, Error> {
        self.paginate_all(|p| self.list_images(p)).await
    }

    // ── Aggregate ────────────────────────────────────────────────────

    /// Fetch servers, load balancers, volumes and domains concurrently.
    ///
    /// Fails as a whole if any of the four requests fails.
    pub async fn fetch_all_entities(&self) -> Result<EntityBundle, Error> {
        let (servers, load_balancers, volumes, domains) = tokio::try_join!(
            self.get_all_servers(),
            self.get_all_load_balancers(),
            self.get_all_volumes(),
            self.get_all_domains(),
        )?;

        Ok(EntityBundle {
            servers,
            load_balancers,
            volumes,
            domains,
        })
    }

    // ── Account ──────────────────────────────────────────────────────

    /// One page of the account event log, newest first.
    pub async fn list_events(&self, page: u32) -> Result<Page<types::EventResponse>, Error> {
        self.get_with_params("account/events", &self.page_params(page))
            .await
    }

    /// Most recent events (first page only). The full log can be very long.
    pub async fn get_recent_events(&self) -> Result<Vec<types::EventResponse>, Error> {
        Ok(self.list_events(1).await?.data)
    }

    pub async fn mark_event_seen(&self, id: u64) -> Result<(), Error> {
        self.post_empty(&format!("account/events/{id}/seen")).await
    }

    pub async fn list_notices(&self, page: u32) -> Result<Page<types::NoticeResponse>, Error> {
        self.get_with_params("account/notices", &self.page_params(page))
            .await
    }

    pub async fn get_all_notices(&self) -> Result<Vec<types::NoticeResponse>, Error> {
        self.paginate_all(|p| self.list_notices(p)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_version_prefix() {
        let client =
            CloudClient::from_reqwest("https://api.example.com", reqwest::Client::new()).unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.example.com/v4/");
    }

    #[test]
    fn base_url_keeps_existing_version_prefix() {
        let client =
            CloudClient::from_reqwest("https://api.example.com/v4/", reqwest::Client::new())
                .unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.example.com/v4/");
        assert_eq!(
            client.url("servers/7/boot").unwrap().as_str(),
            "https://api.example.com/v4/servers/7/boot"
        );
    }

    #[test]
    fn page_size_is_never_zero() {
        let client = CloudClient::from_reqwest("https://api.example.com", reqwest::Client::new())
            .unwrap()
            .with_page_size(0);
        assert_eq!(client.page_size(), 1);
    }
}
