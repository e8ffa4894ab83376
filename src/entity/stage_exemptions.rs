//! 阶段豁免实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stage_exemptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub stage_id: i64,
    pub student_id: i64,
    pub allow_after_hard: bool,
    pub custom_soft: Option<i64>,
    pub custom_hard: Option<i64>,
    pub teacher_id: i64,
    pub reason: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stages::Entity",
        from = "Column::StageId",
        to = "super::stages::Column::Id"
    )]
    Stage,
}

impl Related<super::stages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_exemption(self) -> crate::models::exemptions::entities::StageExemption {
        use crate::models::{exemptions::entities::StageExemption, ts_to_datetime};
        use chrono::{DateTime, Utc};

        StageExemption {
            id: self.id,
            stage_id: self.stage_id,
            student_id: self.student_id,
            allow_after_hard: self.allow_after_hard,
            custom_soft: self
                .custom_soft
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            custom_hard: self
                .custom_hard
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            teacher_id: self.teacher_id,
            reason: self.reason,
            created_at: ts_to_datetime(self.created_at),
        }
    }
}
