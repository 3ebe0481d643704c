use std::sync::Arc;

use axum::http::StatusCode;
use crates::domain::{
    repositories::{
        chapter_catalog::ChapterCatalogRepository, chapter_unlocks::ChapterUnlockRepository,
        coin_ledger::CoinLedgerRepository, users::UserRepository,
    },
    value_objects::{
        chapter_unlocks::{
            ChapterAccess, ChapterAccessDto, ChapterPricing, UnlockCommand, UnlockOutcome,
            UnlockResultDto, Viewer, evaluate_access,
        },
        enums::user_roles::UserRole,
        revenue_share::RevenueShare,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::axum_http::error_responses::ApiError;

#[derive(Debug, Error)]
pub enum UnlockError {
    #[error("chapter not found")]
    ChapterNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("chapter is free")]
    ChapterIsFree,
    #[error("chapter is already readable without coins")]
    NotRequired,
    #[error("insufficient coins: balance {balance}, required {required}")]
    InsufficientFunds { balance: i32, required: i32 },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError for UnlockError {
    fn status_code(&self) -> StatusCode {
        match self {
            UnlockError::ChapterNotFound | UnlockError::UserNotFound => StatusCode::NOT_FOUND,
            UnlockError::ChapterIsFree | UnlockError::NotRequired => StatusCode::BAD_REQUEST,
            UnlockError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
            UnlockError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            UnlockError::ChapterNotFound => "CHAPTER_NOT_FOUND",
            UnlockError::UserNotFound => "USER_NOT_FOUND",
            UnlockError::ChapterIsFree => "CHAPTER_IS_FREE",
            UnlockError::NotRequired => "UNLOCK_NOT_REQUIRED",
            UnlockError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            UnlockError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, UnlockError>;

pub struct ChapterUnlockUseCase<C, U, Usr, L>
where
    C: ChapterCatalogRepository + Send + Sync + 'static,
    U: ChapterUnlockRepository + Send + Sync + 'static,
    Usr: UserRepository + Send + Sync + 'static,
    L: CoinLedgerRepository + Send + Sync + 'static,
{
    catalog_repo: Arc<C>,
    unlock_repo: Arc<U>,
    user_repo: Arc<Usr>,
    ledger_repo: Arc<L>,
    revenue_share: RevenueShare,
}

impl<C, U, Usr, L> ChapterUnlockUseCase<C, U, Usr, L>
where
    C: ChapterCatalogRepository + Send + Sync + 'static,
    U: ChapterUnlockRepository + Send + Sync + 'static,
    Usr: UserRepository + Send + Sync + 'static,
    L: CoinLedgerRepository + Send + Sync + 'static,
{
    pub fn new(
        catalog_repo: Arc<C>,
        unlock_repo: Arc<U>,
        user_repo: Arc<Usr>,
        ledger_repo: Arc<L>,
        revenue_share: RevenueShare,
    ) -> Self {
        Self {
            catalog_repo,
            unlock_repo,
            user_repo,
            ledger_repo,
            revenue_share,
        }
    }

    /// Safe to repeat: a chapter the user already paid for returns success
    /// with `coins_spent = 0`.
    pub async fn unlock_chapter(&self, user_id: Uuid, chapter_id: Uuid) -> UseCaseResult<UnlockResultDto> {
        let existing = self
            .unlock_repo
            .find_spend(user_id, chapter_id)
            .await
            .map_err(|err| {
                error!(%user_id, %chapter_id, db_error = ?err, "chapter_unlock: failed to look up spend");
                UnlockError::Internal(err)
            })?;
        if existing.is_some() {
            info!(%user_id, %chapter_id, "chapter_unlock: already unlocked");
            return self.already_unlocked(user_id).await;
        }

        let pricing = self.load_pricing(chapter_id).await?;
        let role = self
            .user_repo
            .find_role(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "chapter_unlock: failed to load user role");
                UnlockError::Internal(err)
            })?
            .ok_or(UnlockError::UserNotFound)?;
        let viewer = Viewer { user_id, role };

        let price = match evaluate_access(&pricing, Some(&viewer), false) {
            ChapterAccess::Locked { coin_price } => coin_price,
            ChapterAccess::Hidden => return Err(UnlockError::ChapterNotFound),
            ChapterAccess::Free => return Err(UnlockError::ChapterIsFree),
            ChapterAccess::Owner | ChapterAccess::Admin | ChapterAccess::Unlocked => {
                return Err(UnlockError::NotRequired);
            }
        };

        let command = UnlockCommand {
            user_id,
            chapter_id,
            novel_id: pricing.novel_id,
            writer_id: pricing.author_id,
            price,
            chapter_title: pricing.title,
            writer_share: self.revenue_share.split(price),
        };

        let outcome = self.unlock_repo.unlock(command).await.map_err(|err| {
            error!(%user_id, %chapter_id, db_error = ?err, "chapter_unlock: unlock transaction failed");
            UnlockError::Internal(err)
        })?;

        match outcome {
            UnlockOutcome::Unlocked { spend_id, new_balance } => {
                info!(
                    %user_id,
                    %chapter_id,
                    %spend_id,
                    coins_spent = price,
                    new_balance,
                    "chapter_unlock: chapter unlocked"
                );
                Ok(UnlockResultDto::unlocked(new_balance, price))
            }
            UnlockOutcome::AlreadyUnlocked => {
                info!(%user_id, %chapter_id, "chapter_unlock: concurrent unlock already applied");
                self.already_unlocked(user_id).await
            }
            UnlockOutcome::InsufficientFunds { balance, required } => {
                warn!(%user_id, %chapter_id, balance, required, "chapter_unlock: insufficient coins");
                Err(UnlockError::InsufficientFunds { balance, required })
            }
        }
    }

    /// Evaluated on every read. `viewer_id` is `None` for anonymous readers.
    pub async fn check_access(
        &self,
        viewer_id: Option<Uuid>,
        chapter_id: Uuid,
    ) -> UseCaseResult<ChapterAccessDto> {
        let pricing = self.load_pricing(chapter_id).await?;

        let (viewer, has_unlock, balance) = match viewer_id {
            Some(user_id) => {
                let role = self
                    .user_repo
                    .find_role(user_id)
                    .await
                    .map_err(UnlockError::Internal)?
                    .unwrap_or(UserRole::Reader);
                let has_unlock = if pricing.paid_price().is_some() {
                    self.unlock_repo
                        .find_spend(user_id, chapter_id)
                        .await
                        .map_err(UnlockError::Internal)?
                        .is_some()
                } else {
                    false
                };
                let balance = self
                    .ledger_repo
                    .get_balance(user_id)
                    .await
                    .map_err(UnlockError::Internal)?;

                (Some(Viewer { user_id, role }), has_unlock, balance)
            }
            None => (None, false, None),
        };

        let access = evaluate_access(&pricing, viewer.as_ref(), has_unlock);
        if access == ChapterAccess::Hidden {
            return Err(UnlockError::ChapterNotFound);
        }

        Ok(ChapterAccessDto {
            chapter_id,
            access,
            can_read: access.can_read(),
            balance,
        })
    }

    async fn load_pricing(&self, chapter_id: Uuid) -> UseCaseResult<ChapterPricing> {
        self.catalog_repo
            .find_chapter_pricing(chapter_id)
            .await
            .map_err(|err| {
                error!(%chapter_id, db_error = ?err, "chapter_unlock: failed to load chapter");
                UnlockError::Internal(err)
            })?
            .ok_or(UnlockError::ChapterNotFound)
    }

    async fn already_unlocked(&self, user_id: Uuid) -> UseCaseResult<UnlockResultDto> {
        let balance = self
            .ledger_repo
            .get_balance(user_id)
            .await
            .map_err(UnlockError::Internal)?
            .ok_or(UnlockError::UserNotFound)?;
        Ok(UnlockResultDto::already_unlocked(balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::{
        entities::coin_spends::CoinSpendEntity,
        repositories::{
            chapter_catalog::MockChapterCatalogRepository, chapter_unlocks::MockChapterUnlockRepository,
            coin_ledger::MockCoinLedgerRepository, users::MockUserRepository,
        },
    };

    type TestUseCase = ChapterUnlockUseCase<
        MockChapterCatalogRepository,
        MockChapterUnlockRepository,
        MockUserRepository,
        MockCoinLedgerRepository,
    >;

    struct Mocks {
        catalog: MockChapterCatalogRepository,
        unlocks: MockChapterUnlockRepository,
        users: MockUserRepository,
        ledger: MockCoinLedgerRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                catalog: MockChapterCatalogRepository::new(),
                unlocks: MockChapterUnlockRepository::new(),
                users: MockUserRepository::new(),
                ledger: MockCoinLedgerRepository::new(),
            }
        }

        fn with_chapter(mut self, pricing: ChapterPricing) -> Self {
            self.catalog.expect_find_chapter_pricing().returning(move |_| {
                let pricing = pricing.clone();
                Box::pin(async move { Ok(Some(pricing)) })
            });
            self
        }

        fn with_role(mut self, role: UserRole) -> Self {
            self.users
                .expect_find_role()
                .returning(move |_| Box::pin(async move { Ok(Some(role)) }));
            self
        }

        fn with_balance(mut self, balance: i32) -> Self {
            self.ledger
                .expect_get_balance()
                .returning(move |_| Box::pin(async move { Ok(Some(balance)) }));
            self
        }

        fn build(self) -> TestUseCase {
            ChapterUnlockUseCase::new(
                Arc::new(self.catalog),
                Arc::new(self.unlocks),
                Arc::new(self.users),
                Arc::new(self.ledger),
                RevenueShare::new(70, 90).unwrap(),
            )
        }
    }

    fn chapter(coin_price: Option<i32>) -> ChapterPricing {
        ChapterPricing {
            chapter_id: Uuid::new_v4(),
            novel_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            title: "The Vault".to_string(),
            coin_price,
            chapter_published: true,
            novel_published: true,
        }
    }

    fn spend(user_id: Uuid, chapter_id: Uuid) -> CoinSpendEntity {
        CoinSpendEntity {
            id: Uuid::new_v4(),
            user_id,
            chapter_id,
            novel_id: Uuid::new_v4(),
            amount: 10,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn unlock_debits_price_and_splits_revenue() {
        let user_id = Uuid::new_v4();
        let pricing = chapter(Some(10));
        let chapter_id = pricing.chapter_id;
        let author_id = pricing.author_id;

        let mut mocks = Mocks::new().with_chapter(pricing).with_role(UserRole::Reader);
        mocks
            .unlocks
            .expect_find_spend()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        mocks
            .unlocks
            .expect_unlock()
            .withf(move |cmd| {
                cmd.price == 10
                    && cmd.writer_id == author_id
                    && cmd.writer_share.coins_earned == 7
                    && cmd.writer_share.amount_minor == 630
                    && cmd.ledger_note() == "Unlocked: The Vault"
            })
            .times(1)
            .returning(|_| {
                Box::pin(async {
                    Ok(UnlockOutcome::Unlocked {
                        spend_id: Uuid::new_v4(),
                        new_balance: 20,
                    })
                })
            });

        let result = mocks.build().unlock_chapter(user_id, chapter_id).await.unwrap();
        assert_eq!(result, UnlockResultDto::unlocked(20, 10));
    }

    #[tokio::test]
    async fn existing_spend_short_circuits() {
        let user_id = Uuid::new_v4();
        let chapter_id = Uuid::new_v4();

        let mut mocks = Mocks::new().with_balance(20);
        mocks.unlocks.expect_find_spend().returning(move |user_id, chapter_id| {
            let spend = spend(user_id, chapter_id);
            Box::pin(async move { Ok(Some(spend)) })
        });
        mocks.unlocks.expect_unlock().never();
        mocks.catalog.expect_find_chapter_pricing().never();

        let result = mocks.build().unlock_chapter(user_id, chapter_id).await.unwrap();
        assert!(result.already_unlocked);
        assert_eq!(result.coins_spent, 0);
        assert_eq!(result.new_balance, 20);
    }

    #[tokio::test]
    async fn lost_race_returns_idempotent_success() {
        let pricing = chapter(Some(10));
        let chapter_id = pricing.chapter_id;

        let mut mocks = Mocks::new()
            .with_chapter(pricing)
            .with_role(UserRole::Reader)
            .with_balance(20);
        mocks
            .unlocks
            .expect_find_spend()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        mocks
            .unlocks
            .expect_unlock()
            .returning(|_| Box::pin(async { Ok(UnlockOutcome::AlreadyUnlocked) }));

        let result = mocks.build().unlock_chapter(Uuid::new_v4(), chapter_id).await.unwrap();
        assert_eq!(result, UnlockResultDto::already_unlocked(20));
    }

    #[tokio::test]
    async fn insufficient_funds_is_a_distinct_error() {
        let pricing = chapter(Some(10));
        let chapter_id = pricing.chapter_id;

        let mut mocks = Mocks::new().with_chapter(pricing).with_role(UserRole::Reader);
        mocks
            .unlocks
            .expect_find_spend()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        mocks.unlocks.expect_unlock().returning(|_| {
            Box::pin(async {
                Ok(UnlockOutcome::InsufficientFunds {
                    balance: 5,
                    required: 10,
                })
            })
        });

        let err = mocks
            .build()
            .unlock_chapter(Uuid::new_v4(), chapter_id)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UnlockError::InsufficientFunds {
                balance: 5,
                required: 10
            }
        ));
        assert_eq!(err.status_code(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(err.error_code(), "INSUFFICIENT_FUNDS");
    }

    #[tokio::test]
    async fn free_and_missing_chapters_are_rejected() {
        let pricing = chapter(Some(0));
        let chapter_id = pricing.chapter_id;

        let mut mocks = Mocks::new().with_chapter(pricing).with_role(UserRole::Reader);
        mocks
            .unlocks
            .expect_find_spend()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        mocks.unlocks.expect_unlock().never();
        let err = mocks
            .build()
            .unlock_chapter(Uuid::new_v4(), chapter_id)
            .await
            .unwrap_err();
        assert!(matches!(err, UnlockError::ChapterIsFree));

        let mut mocks = Mocks::new();
        mocks
            .unlocks
            .expect_find_spend()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        mocks
            .catalog
            .expect_find_chapter_pricing()
            .returning(|_| Box::pin(async { Ok(None) }));
        let err = mocks
            .build()
            .unlock_chapter(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn owner_does_not_need_to_unlock() {
        let pricing = chapter(Some(10));
        let chapter_id = pricing.chapter_id;
        let author_id = pricing.author_id;

        let mut mocks = Mocks::new().with_chapter(pricing).with_role(UserRole::Writer);
        mocks
            .unlocks
            .expect_find_spend()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        mocks.unlocks.expect_unlock().never();

        let err = mocks.build().unlock_chapter(author_id, chapter_id).await.unwrap_err();
        assert_eq!(err.error_code(), "UNLOCK_NOT_REQUIRED");
    }

    #[tokio::test]
    async fn access_reflects_unlock_row() {
        let user_id = Uuid::new_v4();
        let pricing = chapter(Some(10));
        let chapter_id = pricing.chapter_id;

        let mut mocks = Mocks::new()
            .with_chapter(pricing)
            .with_role(UserRole::Reader)
            .with_balance(20);
        mocks.unlocks.expect_find_spend().returning(move |user_id, chapter_id| {
            let spend = spend(user_id, chapter_id);
            Box::pin(async move { Ok(Some(spend)) })
        });

        let access = mocks.build().check_access(Some(user_id), chapter_id).await.unwrap();
        assert_eq!(access.access, ChapterAccess::Unlocked);
        assert!(access.can_read);
        assert_eq!(access.balance, Some(20));
    }

    #[tokio::test]
    async fn anonymous_reader_sees_locked_chapter() {
        let pricing = chapter(Some(10));
        let chapter_id = pricing.chapter_id;

        let mut mocks = Mocks::new().with_chapter(pricing);
        mocks.unlocks.expect_find_spend().never();
        mocks.ledger.expect_get_balance().never();

        let access = mocks.build().check_access(None, chapter_id).await.unwrap();
        assert_eq!(access.access, ChapterAccess::Locked { coin_price: 10 });
        assert!(!access.can_read);
        assert_eq!(access.balance, None);
    }

    #[tokio::test]
    async fn unpublished_chapter_is_not_found_for_readers() {
        let mut pricing = chapter(None);
        pricing.novel_published = false;
        let chapter_id = pricing.chapter_id;

        let mocks = Mocks::new()
            .with_chapter(pricing)
            .with_role(UserRole::Reader)
            .with_balance(0);

        let err = mocks
            .build()
            .check_access(Some(Uuid::new_v4()), chapter_id)
            .await
            .unwrap_err();
        assert!(matches!(err, UnlockError::ChapterNotFound));
    }
}
