use serde::Deserialize;
use ts_rs::TS;

use super::entities::{GradingMode, PenaltyPolicy};

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CreateCourseRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct EnrollStudentRequest {
    pub course_id: i64,
    pub student_id: i64,
    pub album_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CreateTaskRequest {
    pub course_id: i64,
    pub title: String,
    pub grading_mode: Option<GradingMode>,
    pub max_points: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CreateStageRequest {
    pub task_id: i64,
    pub name: String,
    pub weight_percent: i32,
    pub soft_deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub hard_deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub penalty: Option<PenaltyPolicy>,
}

/// 修改阶段，未提供的字段保持不变
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct UpdateStageRequest {
    pub name: Option<String>,
    pub weight_percent: Option<i32>,
    pub soft_deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub hard_deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub penalty: Option<PenaltyPolicy>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CreateArtifactRequest {
    pub stage_id: i64,
    pub name: String,
    pub max_size_bytes: Option<i64>,
    #[serde(default)]
    pub allowed_extensions: Vec<String>,
}
