use serde::{Deserialize, Serialize};

/// 审计事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    RevisionSubmitted,
    RevisionGraded,
    ExemptionUpserted,
    TaskCreated,
    StageCreated,
    StageUpdated,
    StageDeadlinesChanged,
    ArtifactCreated,
    QueueRebuilt,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::RevisionSubmitted => "REVISION_SUBMITTED",
            AuditEventType::RevisionGraded => "REVISION_GRADED",
            AuditEventType::ExemptionUpserted => "EXEMPTION_UPSERTED",
            AuditEventType::TaskCreated => "TASK_CREATED",
            AuditEventType::StageCreated => "STAGE_CREATED",
            AuditEventType::StageUpdated => "STAGE_UPDATED",
            AuditEventType::StageDeadlinesChanged => "STAGE_DEADLINES_CHANGED",
            AuditEventType::ArtifactCreated => "ARTIFACT_CREATED",
            AuditEventType::QueueRebuilt => "QUEUE_REBUILT",
        }
    }
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 审计日志
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: i64,
    pub event_type: String,
    pub actor_id: Option<i64>,
    pub context: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
