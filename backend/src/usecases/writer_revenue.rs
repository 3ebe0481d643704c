use std::sync::Arc;

use axum::http::StatusCode;
use crates::domain::{
    repositories::writer_revenues::WriterRevenueRepository,
    value_objects::writer_revenues::{RECENT_EARNINGS_LIMIT, WriterEarningItemDto, WriterEarningsDto},
};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::axum_http::error_responses::ApiError;

#[derive(Debug, Error)]
pub enum WriterRevenueError {
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError for WriterRevenueError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_code(&self) -> &'static str {
        "INTERNAL_ERROR"
    }
}

pub struct WriterRevenueUseCase<W>
where
    W: WriterRevenueRepository + Send + Sync + 'static,
{
    revenue_repo: Arc<W>,
}

impl<W> WriterRevenueUseCase<W>
where
    W: WriterRevenueRepository + Send + Sync + 'static,
{
    pub fn new(revenue_repo: Arc<W>) -> Self {
        Self { revenue_repo }
    }

    pub async fn get_writer_earnings(
        &self,
        writer_id: Uuid,
    ) -> Result<WriterEarningsDto, WriterRevenueError> {
        let totals = self.revenue_repo.totals(writer_id).await.map_err(|err| {
            error!(%writer_id, db_error = ?err, "writer_revenue: failed to sum earnings");
            WriterRevenueError::Internal(err)
        })?;
        let recent = self
            .revenue_repo
            .recent(writer_id, RECENT_EARNINGS_LIMIT)
            .await
            .map_err(|err| {
                error!(%writer_id, db_error = ?err, "writer_revenue: failed to load recent earnings");
                WriterRevenueError::Internal(err)
            })?;

        Ok(WriterEarningsDto {
            total_coins_earned: totals.total_coins_earned,
            total_amount_minor: totals.total_amount_minor,
            recent_earnings: recent.into_iter().map(WriterEarningItemDto::from).collect(),
        })
    }
}
