//! 评分队列实体（读模型）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grading_queue")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub artifact_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: i64,
    pub stage_id: i64,
    pub task_id: i64,
    pub course_id: i64,
    pub album_number: Option<String>,
    pub student_name: Option<String>,
    pub last_revision_id: i64,
    pub last_revision_status: String,
    pub last_submitted_at: i64,
    pub soft_deadline: Option<i64>,
    pub hard_deadline: Option<i64>,
    pub late_days_started: i32,
    pub penalty_percent_applied: f64,
    pub penalty_waived: bool,
    pub last_points_brutto: Option<f64>,
    pub last_points_netto: Option<f64>,
    pub last_accepted_revision_id: Option<i64>,
    pub last_accepted_points_netto: Option<f64>,
    pub flag_new_submission: bool,
    pub version: i64,
    pub updated_at: i64,
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
        belongs_to = "super::stages::Entity",
        from = "Column::StageId",
        to = "super::stages::Column::Id"
    )]
    Stage,
}

impl Related<super::artifacts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artifact.def()
    }
}

impl Related<super::stages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_entry(self) -> crate::models::grading_queue::entities::GradingQueueEntry {
        use crate::models::{
            grading_queue::entities::GradingQueueEntry, revisions::entities::RevisionStatus,
            ts_to_datetime,
        };
        use chrono::{DateTime, Utc};

        GradingQueueEntry {
            artifact_id: self.artifact_id,
            student_id: self.student_id,
            stage_id: self.stage_id,
            task_id: self.task_id,
            course_id: self.course_id,
            album_number: self.album_number,
            student_name: self.student_name,
            last_revision_id: self.last_revision_id,
            last_revision_status: self
                .last_revision_status
                .parse::<RevisionStatus>()
                .unwrap_or(RevisionStatus::Submitted),
            last_submitted_at: ts_to_datetime(self.last_submitted_at),
            soft_deadline: self
                .soft_deadline
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            hard_deadline: self
                .hard_deadline
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            late_days_started: self.late_days_started,
            penalty_percent_applied: self.penalty_percent_applied,
            penalty_waived: self.penalty_waived,
            last_points_brutto: self.last_points_brutto,
            last_points_netto: self.last_points_netto,
            last_accepted_revision_id: self.last_accepted_revision_id,
            last_accepted_points_netto: self.last_accepted_points_netto,
            flag_new_submission: self.flag_new_submission,
            version: self.version,
        }
    }
}
