use std::sync::Arc;

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use crates::{
    domain::repositories::writer_revenues::WriterRevenueRepository,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::writer_revenues::WriterRevenuePostgres,
    },
};

use crate::{
    auth::AuthUser, axum_http::error_responses::error_response,
    usecases::writer_revenue::WriterRevenueUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let writer_revenue_repository = WriterRevenuePostgres::new(Arc::clone(&db_pool));
    let writer_revenue_usecase = WriterRevenueUseCase::new(Arc::new(writer_revenue_repository));

    Router::new()
        .route("/revenue", get(get_writer_earnings::<WriterRevenuePostgres>))
        .with_state(Arc::new(writer_revenue_usecase))
}

pub async fn get_writer_earnings<W>(
    State(writer_revenue_usecase): State<Arc<WriterRevenueUseCase<W>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    W: WriterRevenueRepository + Send + Sync + 'static,
{
    match writer_revenue_usecase.get_writer_earnings(auth.user_id).await {
        Ok(earnings) => Json(earnings).into_response(),
        Err(err) => error_response(&err),
    }
}
