//! 任务实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub grading_mode: String,
    pub max_points: Option<f64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::stages::Entity")]
    Stages,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::stages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_task(self) -> crate::models::courses::entities::Task {
        use crate::models::{
            courses::entities::{GradingMode, Task},
            ts_to_datetime,
        };

        Task {
            id: self.id,
            course_id: self.course_id,
            title: self.title,
            grading_mode: self
                .grading_mode
                .parse::<GradingMode>()
                .unwrap_or(GradingMode::Percent),
            max_points: self.max_points,
            created_at: ts_to_datetime(self.created_at),
        }
    }
}
