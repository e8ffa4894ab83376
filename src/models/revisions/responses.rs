use serde::Serialize;
use ts_rs::TS;

use super::entities::Revision;
use crate::models::grades::entities::Grade;

/// 修订历史项（含该修订的全部评分记录，按时间升序）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/revision.ts")]
pub struct RevisionHistoryItem {
    pub revision: Revision,
    pub grades: Vec<Grade>,
}

/// 修订历史响应（最新修订在前）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/revision.ts")]
pub struct RevisionHistoryResponse {
    pub artifact_id: i64,
    pub student_id: i64,
    pub items: Vec<RevisionHistoryItem>,
}
