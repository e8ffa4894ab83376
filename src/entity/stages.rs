//! 阶段实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: i64,
    pub name: String,
    pub weight_percent: i32,
    pub soft_deadline: Option<i64>,
    pub hard_deadline: Option<i64>,
    pub penalty_k_percent_per24h: f64,
    pub penalty_max_m_percent: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tasks::Entity",
        from = "Column::TaskId",
        to = "super::tasks::Column::Id"
    )]
    Task,
    #[sea_orm(has_many = "super::artifacts::Entity")]
    Artifacts,
    #[sea_orm(has_many = "super::stage_exemptions::Entity")]
    Exemptions,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl Related<super::artifacts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artifacts.def()
    }
}

impl Related<super::stage_exemptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exemptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_stage(self) -> crate::models::courses::entities::Stage {
        use crate::models::courses::entities::{PenaltyPolicy, Stage};
        use chrono::{DateTime, Utc};

        Stage {
            id: self.id,
            task_id: self.task_id,
            name: self.name,
            weight_percent: self.weight_percent,
            soft_deadline: self
                .soft_deadline
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            hard_deadline: self
                .hard_deadline
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            penalty: PenaltyPolicy {
                k_percent_per_24h: self.penalty_k_percent_per24h,
                max_m_percent: self.penalty_max_m_percent,
            },
        }
    }
}
