use super::SeaOrmStorage;
use crate::entity::audit_logs::{ActiveModel, Column, Entity as AuditLogs};
use crate::errors::{GradingError, Result};
use crate::models::audit::entities::{AuditEventType, AuditLog};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 追加审计日志
    pub async fn append_audit_log_impl(
        &self,
        event_type: AuditEventType,
        actor_id: Option<i64>,
        context: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<AuditLog> {
        let model = ActiveModel {
            event_type: Set(event_type.as_str().to_string()),
            actor_id: Set(actor_id),
            context: Set(serde_json::to_string(&context)?),
            created_at: Set(now.timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("写入审计日志失败: {e}")))?;

        Ok(result.into_audit_log())
    }

    /// 列出审计日志，按写入顺序
    pub async fn list_audit_logs_impl(
        &self,
        event_type: Option<AuditEventType>,
    ) -> Result<Vec<AuditLog>> {
        let mut select = AuditLogs::find();
        if let Some(event_type) = event_type {
            select = select.filter(Column::EventType.eq(event_type.as_str()));
        }

        let result = select
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询审计日志失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_audit_log()).collect())
    }
}
