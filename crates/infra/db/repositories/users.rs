use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::users},
};
use domain::{
    repositories::users::UserRepository, value_objects::enums::user_roles::UserRole,
};

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn find_role(&self, user_id: Uuid) -> Result<Option<UserRole>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let role = users::table
            .filter(users::id.eq(user_id))
            .select(users::role)
            .first::<String>(&mut conn)
            .optional()?;

        Ok(role.as_deref().map(UserRole::from_str))
    }
}
