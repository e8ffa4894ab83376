use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::revisions::entities::RevisionStatus;

/// 评分队列读模型主键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading_queue.ts")]
pub struct QueueKey {
    pub artifact_id: i64,
    pub student_id: i64,
}

impl QueueKey {
    pub fn new(artifact_id: i64, student_id: i64) -> Self {
        Self {
            artifact_id,
            student_id,
        }
    }
}

/// 评分队列条目（每个 (artifact, student) 一行）
///
/// 派生投影，可随时由修订、评分、阶段与豁免数据重建。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading_queue.ts")]
pub struct GradingQueueEntry {
    pub artifact_id: i64,
    pub student_id: i64,
    pub stage_id: i64,
    pub task_id: i64,
    pub course_id: i64,
    pub album_number: Option<String>,
    pub student_name: Option<String>,
    pub last_revision_id: i64,
    pub last_revision_status: RevisionStatus,
    pub last_submitted_at: chrono::DateTime<chrono::Utc>,
    // 生效的截止时间（阶段默认值被豁免覆盖后）
    pub soft_deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub hard_deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub late_days_started: i32,
    pub penalty_percent_applied: f64,
    // 最近一次评分免除了迟交惩罚
    pub penalty_waived: bool,
    pub last_points_brutto: Option<f64>,
    pub last_points_netto: Option<f64>,
    pub last_accepted_revision_id: Option<i64>,
    pub last_accepted_points_netto: Option<f64>,
    // 有新提交等待评分
    pub flag_new_submission: bool,
    // 乐观锁版本号
    pub version: i64,
}

impl GradingQueueEntry {
    pub fn key(&self) -> QueueKey {
        QueueKey::new(self.artifact_id, self.student_id)
    }

    /// 是否已评分（当前修订有原始分）
    pub fn is_graded(&self) -> bool {
        self.last_points_brutto.is_some()
    }
}
