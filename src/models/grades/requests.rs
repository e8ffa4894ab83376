use serde::Deserialize;
use ts_rs::TS;

use crate::models::revisions::entities::RevisionStatus;

/// 评分请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeRevisionRequest {
    pub revision_id: i64,
    pub points: f64,
    pub comment: Option<String>,
    pub status_after_grade: RevisionStatus,
    // 免除迟交惩罚（净分 = 截断后的原始分）
    #[serde(default)]
    pub skip_penalty: bool,
}
