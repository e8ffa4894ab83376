use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 学生在某阶段的截止时间豁免
///
/// 每个 (stage, student) 至多一条，后写覆盖先写。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exemption.ts")]
pub struct StageExemption {
    pub id: i64,
    pub stage_id: i64,
    pub student_id: i64,
    pub allow_after_hard: bool,
    // 为空时沿用阶段默认值
    pub custom_soft: Option<chrono::DateTime<chrono::Utc>>,
    pub custom_hard: Option<chrono::DateTime<chrono::Utc>>,
    pub teacher_id: i64,
    pub reason: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
