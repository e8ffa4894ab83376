use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::revisions::entities::RevisionStatus;

/// 一次评分事件（只追加，重新评分会新增记录）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct Grade {
    pub id: i64,
    pub revision_id: i64,
    pub teacher_id: i64,
    // 教师给出的原始分
    pub points_brutto: f64,
    // 扣除迟交惩罚并按评分模式截断后的分数
    pub points_netto: f64,
    // 评分时免除了迟交惩罚
    pub penalty_skipped: bool,
    pub status_after_grade: RevisionStatus,
    pub comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
