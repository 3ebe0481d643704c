use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::{enums::user_roles::UserRole, revenue_share::WriterShare};

/// What the content store knows about a chapter's price and ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterPricing {
    pub chapter_id: Uuid,
    pub novel_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub coin_price: Option<i32>,
    pub chapter_published: bool,
    pub novel_published: bool,
}

impl ChapterPricing {
    /// A zero or absent price means the chapter is free.
    pub fn paid_price(&self) -> Option<i32> {
        self.coin_price.filter(|price| *price > 0)
    }
}

/// Authenticated reader with the role re-read from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Uuid,
    pub role: UserRole,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "access", rename_all = "snake_case")]
pub enum ChapterAccess {
    Hidden,
    Free,
    Owner,
    Admin,
    Unlocked,
    Locked { coin_price: i32 },
}

impl ChapterAccess {
    pub fn can_read(&self) -> bool {
        !matches!(self, ChapterAccess::Hidden | ChapterAccess::Locked { .. })
    }
}

/// Access predicate for one chapter read. `has_unlock` reports whether the
/// viewer holds a coin spend row for the chapter.
pub fn evaluate_access(
    pricing: &ChapterPricing,
    viewer: Option<&Viewer>,
    has_unlock: bool,
) -> ChapterAccess {
    let is_owner = viewer.is_some_and(|viewer| viewer.user_id == pricing.author_id);
    let is_admin = viewer.is_some_and(|viewer| viewer.role == UserRole::Admin);
    let published = pricing.novel_published && pricing.chapter_published;

    if !published && !is_owner && !is_admin {
        return ChapterAccess::Hidden;
    }

    let Some(coin_price) = pricing.paid_price() else {
        return ChapterAccess::Free;
    };

    if is_owner {
        ChapterAccess::Owner
    } else if is_admin {
        ChapterAccess::Admin
    } else if viewer.is_some() && has_unlock {
        ChapterAccess::Unlocked
    } else {
        ChapterAccess::Locked { coin_price }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockCommand {
    pub user_id: Uuid,
    pub chapter_id: Uuid,
    pub novel_id: Uuid,
    pub writer_id: Uuid,
    pub price: i32,
    pub chapter_title: String,
    pub writer_share: WriterShare,
}

impl UnlockCommand {
    pub fn ledger_note(&self) -> String {
        format!("Unlocked: {}", self.chapter_title)
    }
}

/// Result of the atomic unlock unit. A unique-constraint loss on
/// (user_id, chapter_id) is reported as `AlreadyUnlocked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked { spend_id: Uuid, new_balance: i32 },
    AlreadyUnlocked,
    InsufficientFunds { balance: i32, required: i32 },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct UnlockResultDto {
    pub success: bool,
    pub already_unlocked: bool,
    pub new_balance: i32,
    pub coins_spent: i32,
}

impl UnlockResultDto {
    pub fn unlocked(new_balance: i32, coins_spent: i32) -> Self {
        Self {
            success: true,
            already_unlocked: false,
            new_balance,
            coins_spent,
        }
    }

    pub fn already_unlocked(balance: i32) -> Self {
        Self {
            success: true,
            already_unlocked: true,
            new_balance: balance,
            coins_spent: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ChapterAccessDto {
    pub chapter_id: Uuid,
    #[serde(flatten)]
    pub access: ChapterAccess,
    pub can_read: bool,
    pub balance: Option<i32>,
}
