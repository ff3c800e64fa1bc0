use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set, SqlErr, TransactionTrait};

use super::{SqlStore, UserDirectory, now_sec};
use crate::{
    entities::{rating, user},
    error::{AppResult, RequestError},
    models::{Reviewer, User},
};

#[async_trait]
impl UserDirectory for SqlStore {
    async fn create_user(&self, username: &str) -> AppResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(RequestError::EmptyUsername.into());
        }

        let model = user::ActiveModel {
            id: Default::default(),
            username: Set(username.to_string()),
            created_at: Set(now_sec()),
        };

        // The unique index decides races between two registrations.
        match user::Entity::insert(model).exec_with_returning(&self.db).await {
            Ok(created) => Ok(created.into()),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(RequestError::UsernameTaken(username.to_string()).into())
            },
            Err(err) => Err(err.into()),
        }
    }

    async fn user_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?.map(User::from))
    }

    async fn user_by_name(&self, username: &str) -> AppResult<Option<User>> {
        let row = user::Entity::find()
            .filter(user::Column::Username.eq(username.trim()))
            .one(&self.db)
            .await?;
        Ok(row.map(User::from))
    }

    async fn top_reviewers(&self, limit: usize) -> AppResult<Vec<Reviewer>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let txn = self.db.begin().await?;
        let ratings = rating::Entity::find().all(&txn).await?;
        let mut counts: HashMap<i32, u32> = HashMap::new();
        for r in &ratings {
            *counts.entry(r.user_id).or_default() += 1;
        }
        let users = user::Entity::find()
            .filter(user::Column::Id.is_in(counts.keys().copied()))
            .all(&txn)
            .await?;
        txn.commit().await?;

        let mut reviewers: Vec<Reviewer> = users
            .into_iter()
            .map(|u| Reviewer {
                rating_count: counts.get(&u.id).copied().unwrap_or(0),
                user: u.into(),
            })
            .collect();
        reviewers.sort_by(|a, b| {
            b.rating_count.cmp(&a.rating_count).then_with(|| a.user.id.cmp(&b.user.id))
        });
        reviewers.truncate(limit);

        Ok(reviewers)
    }
}
