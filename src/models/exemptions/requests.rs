use serde::Deserialize;
use ts_rs::TS;

/// 新增或覆盖豁免
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exemption.ts")]
pub struct UpsertExemptionRequest {
    pub stage_id: i64,
    pub student_id: i64,
    #[serde(default)]
    pub allow_after_hard: bool,
    pub custom_soft: Option<chrono::DateTime<chrono::Utc>>,
    pub custom_hard: Option<chrono::DateTime<chrono::Utc>>,
    pub reason: Option<String>,
}
