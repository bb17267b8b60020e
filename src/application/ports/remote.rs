use crate::domain::entities::{Product, Quote, QuotePage};
use crate::domain::entities::quote::QuoteDraft;
use crate::shared::error::AppError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Thin wire-protocol client for the backend's record endpoints.
///
/// Every call is cancellable: when the token fires, the in-flight request
/// is dropped on the spot and the call resolves to `AppError::Aborted`,
/// which callers treat as non-fatal. Non-2xx responses surface as
/// `AppError::Remote`; transport failures as `AppError::Network`. Page
/// numbers are validated (>= 1) by the caller before invocation.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn create_quote(
        &self,
        draft: &QuoteDraft,
        cancel: &CancellationToken,
    ) -> Result<Quote, AppError>;

    async fn list_quotes(
        &self,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<QuotePage, AppError>;

    async fn list_products(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Product>, AppError>;
}
