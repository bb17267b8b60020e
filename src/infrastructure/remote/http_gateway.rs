use crate::application::ports::remote::RemoteGateway;
use crate::domain::entities::quote::{QuoteDraft, QuoteSummary};
use crate::domain::entities::{Product, Quote, QuotePage};
use crate::shared::config::RemoteConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const QUOTES_PATH: &str = "/api/collections/quotes/records";
const PRODUCTS_PATH: &str = "/api/collections/products/records";
const QUOTE_LIST_PARAMS: &str = "?sort=-updated&fields=id,status,total,created,customer_info";
const PRODUCT_LIST_PARAMS: &str = "?sort=+title&fields=id,title,price";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    page: u32,
    per_page: u32,
    total_items: u64,
    total_pages: u32,
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ProductListResponse {
    items: Vec<Product>,
}

/// HTTP client for the backend's collection endpoints.
///
/// Every request carries the configured deadline and races against the
/// caller's cancellation token; dropping the in-flight future aborts the
/// underlying request on any exit path.
pub struct HttpGateway {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpGateway {
    pub fn new(config: RemoteConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| AppError::Network(err.to_string()))?;
        Ok(Self { client, config })
    }

    fn create_quote_url(&self) -> String {
        format!("{}{}", self.config.base_url, QUOTES_PATH)
    }

    fn list_quotes_url(&self, page: u32) -> String {
        format!(
            "{}{}{}&perPage={}&page={}",
            self.config.base_url, QUOTES_PATH, QUOTE_LIST_PARAMS, self.config.per_page, page
        )
    }

    fn list_products_url(&self) -> String {
        format!(
            "{}{}{}",
            self.config.base_url, PRODUCTS_PATH, PRODUCT_LIST_PARAMS
        )
    }
}

/// Race a request future against cooperative cancellation. Losing the race
/// drops the request, which aborts it and releases its resources.
async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(AppError::Aborted),
        result = fut => result,
    }
}

fn check_status(status: StatusCode) -> Result<(), AppError> {
    if status.is_success() {
        return Ok(());
    }
    Err(AppError::Remote {
        status: status.as_u16(),
        status_text: status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string(),
    })
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn create_quote(
        &self,
        draft: &QuoteDraft,
        cancel: &CancellationToken,
    ) -> Result<Quote, AppError> {
        let url = self.create_quote_url();
        debug!(%url, "creating quote");
        cancellable(cancel, async {
            let response = self.client.post(&url).json(draft).send().await?;
            check_status(response.status())?;
            Ok(response.json::<Quote>().await?)
        })
        .await
    }

    async fn list_quotes(
        &self,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<QuotePage, AppError> {
        let url = self.list_quotes_url(page);
        debug!(%url, "listing quotes");
        cancellable(cancel, async {
            let response = self.client.get(&url).send().await?;
            check_status(response.status())?;
            let body = response.json::<ListResponse<QuoteSummary>>().await?;
            Ok(QuotePage {
                items: body.items,
                page_number: body.page,
                total_pages: body.total_pages,
                total_items: body.total_items,
                per_page: body.per_page,
            })
        })
        .await
    }

    async fn list_products(&self, cancel: &CancellationToken) -> Result<Vec<Product>, AppError> {
        let url = self.list_products_url();
        debug!(%url, "listing products");
        cancellable(cancel, async {
            let response = self.client.get(&url).send().await?;
            check_status(response.status())?;
            let body = response.json::<ProductListResponse>().await?;
            Ok(body.items)
        })
        .await
    }
}
