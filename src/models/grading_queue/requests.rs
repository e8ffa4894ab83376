use serde::Deserialize;
use ts_rs::TS;

use crate::models::revisions::entities::RevisionStatus;

/// 截止时间筛选
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grading_queue.ts")]
pub enum DeadlineFilter {
    Upcoming, // 软截止时间尚未到
    Overdue,  // 已过软截止时间
    Critical, // 已过硬截止时间
}

/// 排序方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grading_queue.ts")]
pub enum QueueSort {
    #[default]
    Deadline, // 软截止时间升序，无截止时间的排最后
    SubmittedAt,
    Status,
    StudentName,
    Penalty, // 惩罚百分比降序
}

/// 阶段评分队列查询
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading_queue.ts")]
pub struct QueueListQuery {
    pub status: Option<RevisionStatus>,
    pub deadline: Option<DeadlineFilter>,
    // 学号前缀（按小组筛选）
    pub album_prefix: Option<String>,
    pub only_new: Option<bool>,
    #[serde(default)]
    pub sort_by: QueueSort,
}
