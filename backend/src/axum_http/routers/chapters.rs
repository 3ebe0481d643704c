use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{
            chapter_catalog::ChapterCatalogRepository, chapter_unlocks::ChapterUnlockRepository,
            coin_ledger::CoinLedgerRepository, users::UserRepository,
        },
        value_objects::revenue_share::RevenueShare,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            chapter_catalog::ChapterCatalogPostgres, chapter_unlocks::ChapterUnlockPostgres,
            coin_ledger::CoinLedgerPostgres, users::UserPostgres,
        },
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::error_response,
    usecases::chapter_unlock::ChapterUnlockUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>, revenue_share: RevenueShare) -> Router {
    let chapter_unlock_usecase = ChapterUnlockUseCase::new(
        Arc::new(ChapterCatalogPostgres::new(Arc::clone(&db_pool))),
        Arc::new(ChapterUnlockPostgres::new(Arc::clone(&db_pool))),
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
        Arc::new(CoinLedgerPostgres::new(Arc::clone(&db_pool))),
        revenue_share,
    );

    Router::new()
        .route(
            "/:chapter_id/unlock",
            post(
                unlock_chapter::<
                    ChapterCatalogPostgres,
                    ChapterUnlockPostgres,
                    UserPostgres,
                    CoinLedgerPostgres,
                >,
            ),
        )
        .route(
            "/:chapter_id/access",
            get(
                check_access::<
                    ChapterCatalogPostgres,
                    ChapterUnlockPostgres,
                    UserPostgres,
                    CoinLedgerPostgres,
                >,
            ),
        )
        .with_state(Arc::new(chapter_unlock_usecase))
}

pub async fn unlock_chapter<C, U, Usr, L>(
    State(chapter_unlock_usecase): State<Arc<ChapterUnlockUseCase<C, U, Usr, L>>>,
    auth: AuthUser,
    Path(chapter_id): Path<Uuid>,
) -> impl IntoResponse
where
    C: ChapterCatalogRepository + Send + Sync + 'static,
    U: ChapterUnlockRepository + Send + Sync + 'static,
    Usr: UserRepository + Send + Sync + 'static,
    L: CoinLedgerRepository + Send + Sync + 'static,
{
    match chapter_unlock_usecase
        .unlock_chapter(auth.user_id, chapter_id)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(err) => error_response(&err),
    }
}

/// Anonymous readers are allowed; an invalid token is treated as anonymous.
pub async fn check_access<C, U, Usr, L>(
    State(chapter_unlock_usecase): State<Arc<ChapterUnlockUseCase<C, U, Usr, L>>>,
    auth: Option<AuthUser>,
    Path(chapter_id): Path<Uuid>,
) -> impl IntoResponse
where
    C: ChapterCatalogRepository + Send + Sync + 'static,
    U: ChapterUnlockRepository + Send + Sync + 'static,
    Usr: UserRepository + Send + Sync + 'static,
    L: CoinLedgerRepository + Send + Sync + 'static,
{
    let viewer_id = auth.map(|auth| auth.user_id);

    match chapter_unlock_usecase.check_access(viewer_id, chapter_id).await {
        Ok(access) => Json(access).into_response(),
        Err(err) => error_response(&err),
    }
}
