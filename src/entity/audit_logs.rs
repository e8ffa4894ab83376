//! 审计日志实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub event_type: String,
    pub actor_id: Option<i64>,
    #[sea_orm(column_type = "Text")]
    pub context: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_audit_log(self) -> crate::models::audit::entities::AuditLog {
        use crate::models::{audit::entities::AuditLog, ts_to_datetime};

        AuditLog {
            id: self.id,
            event_type: self.event_type,
            actor_id: self.actor_id,
            context: serde_json::from_str(&self.context).unwrap_or(serde_json::Value::Null),
            created_at: ts_to_datetime(self.created_at),
        }
    }
}
