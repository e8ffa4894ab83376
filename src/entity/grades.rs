//! 评分实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub revision_id: i64,
    pub teacher_id: i64,
    pub points_brutto: f64,
    pub points_netto: f64,
    pub penalty_skipped: bool,
    pub status_after_grade: String,
    pub comment: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::revisions::Entity",
        from = "Column::RevisionId",
        to = "super::revisions::Column::Id"
    )]
    Revision,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::TeacherId",
        to = "super::users::Column::Id"
    )]
    Teacher,
}

impl Related<super::revisions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Revision.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_grade(self) -> crate::models::grades::entities::Grade {
        use crate::models::{
            grades::entities::Grade, revisions::entities::RevisionStatus, ts_to_datetime,
        };

        Grade {
            id: self.id,
            revision_id: self.revision_id,
            teacher_id: self.teacher_id,
            points_brutto: self.points_brutto,
            points_netto: self.points_netto,
            penalty_skipped: self.penalty_skipped,
            status_after_grade: self
                .status_after_grade
                .parse::<RevisionStatus>()
                .unwrap_or(RevisionStatus::Submitted),
            comment: self.comment,
            created_at: ts_to_datetime(self.created_at),
        }
    }
}
