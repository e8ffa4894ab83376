use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{GradingError, Result};
use crate::models::users::{entities::User, requests::CreateUserRequest};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest, now: DateTime<Utc>) -> Result<User> {
        let existing = Users::find()
            .filter(Column::Email.eq(req.email.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询用户失败: {e}")))?;
        if existing.is_some() {
            return Err(GradingError::validation(format!(
                "Email {} is already registered",
                req.email
            )));
        }

        let model = ActiveModel {
            first_name: Set(req.first_name),
            last_name: Set(req.last_name),
            email: Set(req.email),
            created_at: Set(now.timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("创建用户失败: {e}")))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }
}

/// 获取用户展示名
pub(super) async fn find_user_display_name<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<Option<String>> {
    let result = Users::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| GradingError::database_operation(format!("查询用户失败: {e}")))?;

    Ok(result.map(|m| m.into_user().display_name()))
}
