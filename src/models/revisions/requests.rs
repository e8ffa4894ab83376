use serde::Deserialize;
use ts_rs::TS;

/// 提交修订请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/revision.ts")]
pub struct SubmitRevisionRequest {
    pub artifact_id: i64,
    pub file_key: String,
    pub original_file_name: String,
    pub mime_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub comment: Option<String>,
}
