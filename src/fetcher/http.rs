//! HTTP page fetcher for the remote JSON API

use super::traits::{PageFetcher, SourceDirectory};
use crate::config::ApiConfig;
use crate::error::{Error, RemoteError, Result};
use crate::types::{DjRef, PageRequest, PageResult, RawDj, RawProgram, SourceDetail};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

/// API status code carried by successful payloads
const SUCCESS_CODE: i64 = 200;

fn success_code() -> i64 {
    SUCCESS_CODE
}

#[derive(Deserialize)]
struct ProgramPage {
    #[serde(default = "success_code")]
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    programs: Option<Vec<RawProgram>>,
    #[serde(default)]
    more: Option<bool>,
}

#[derive(Deserialize)]
struct DetailEnvelope {
    #[serde(default = "success_code")]
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(rename = "djRadio", default)]
    dj_radio: Option<RawRadio>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRadio {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    pic_url: Option<String>,
    #[serde(default)]
    dj: Option<RawDj>,
}

impl From<RawRadio> for SourceDetail {
    fn from(raw: RawRadio) -> Self {
        let id = raw.id.to_string();
        Self {
            name: raw.name.unwrap_or_else(|| id.clone()),
            id,
            description: raw.desc,
            cover_url: raw.pic_url,
            dj: raw.dj.and_then(|dj| {
                dj.user_id.map(|id| DjRef {
                    id,
                    name: dj.nickname.unwrap_or_default(),
                })
            }),
        }
    }
}

fn check_code(code: i64, message: Option<&str>) -> Result<()> {
    if code == SUCCESS_CODE {
        return Ok(());
    }
    Err(RemoteError::Api {
        code,
        message: message.unwrap_or("no message").to_string(),
    }
    .into())
}

/// Page fetcher backed by `reqwest`
///
/// Requests:
/// - `GET {base}/dj/program?rid=&offset=&limit=&asc=` for pages
/// - `GET {base}/dj/detail?rid=` for source details
///
/// The cancellation token is checked before the request is issued. While the
/// request is in flight it is raced against the token; dropping the request
/// future aborts the transfer.
pub struct HttpPageFetcher {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpPageFetcher {
    /// Build a fetcher with its own client from the API settings
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be created
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&api.base_url).map_err(|e| {
            Error::config(
                format!("invalid base_url '{}': {}", api.base_url, e),
                "api.base_url",
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(api.timeout)
            .user_agent(api.user_agent.clone())
            .build()
            .map_err(RemoteError::Transport)?;

        Ok(Self::with_client(client, base_url))
    }

    /// Build a fetcher around an existing client
    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::config(
                    format!("base_url '{}' cannot carry a path", self.base_url),
                    "api.base_url",
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn page_url(&self, request: &PageRequest) -> Result<Url> {
        let mut url = self.endpoint(&["dj", "program"])?;
        url.query_pairs_mut()
            .append_pair("rid", &request.source_id)
            .append_pair("offset", &request.offset.to_string())
            .append_pair("limit", &request.limit.to_string())
            .append_pair("asc", if request.ascending { "true" } else { "false" });
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(RemoteError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        let body = response.bytes().await.map_err(RemoteError::Transport)?;
        serde_json::from_slice(&body).map_err(|e| Error::from(RemoteError::Parse(e.to_string())))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(
        &self,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> Result<PageResult> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let url = self.page_url(request)?;
        tracing::debug!(
            source_id = %request.source_id,
            offset = request.offset,
            limit = request.limit,
            ascending = request.ascending,
            "Fetching page"
        );

        let page = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = self.get_json::<ProgramPage>(url) => result?,
        };
        check_code(page.code, page.message.as_deref())?;

        Ok(PageResult {
            items: page.programs.unwrap_or_default(),
            has_more: page.more.unwrap_or(false),
        })
    }
}

#[async_trait]
impl SourceDirectory for HttpPageFetcher {
    async fn fetch_detail(&self, source_id: &str) -> Result<SourceDetail> {
        let mut url = self.endpoint(&["dj", "detail"])?;
        url.query_pairs_mut().append_pair("rid", source_id);

        tracing::debug!(source_id, "Fetching source detail");
        let envelope: DetailEnvelope = self.get_json(url).await?;
        check_code(envelope.code, envelope.message.as_deref())?;

        envelope
            .dj_radio
            .map(SourceDetail::from)
            .ok_or_else(|| RemoteError::Parse("response has no djRadio object".into()).into())
    }
}
