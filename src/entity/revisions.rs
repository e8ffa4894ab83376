//! 修订实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "revisions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub artifact_id: i64,
    pub student_id: i64,
    pub file_key: String,
    pub original_file_name: String,
    pub mime_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub status: String,
    pub comment: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::artifacts::Entity",
        from = "Column::ArtifactId",
        to = "super::artifacts::Column::Id"
    )]
    Artifact,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
    #[sea_orm(has_many = "super::grades::Entity")]
    Grades,
}

impl Related<super::artifacts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artifact.def()
    }
}

impl Related<super::grades::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grades.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_revision(self) -> crate::models::revisions::entities::Revision {
        use crate::models::{
            revisions::entities::{Revision, RevisionStatus},
            ts_to_datetime,
        };

        Revision {
            id: self.id,
            artifact_id: self.artifact_id,
            student_id: self.student_id,
            file_key: self.file_key,
            original_file_name: self.original_file_name,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
            status: self
                .status
                .parse::<RevisionStatus>()
                .unwrap_or(RevisionStatus::Submitted),
            comment: self.comment,
            created_at: ts_to_datetime(self.created_at),
        }
    }
}
