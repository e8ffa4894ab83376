use serde::Serialize;
use ts_rs::TS;

/// 任务阶段权重状态
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct WeightStatus {
    pub current_total: i32,
    pub remaining: i32,
    pub stage_count: usize,
}

impl WeightStatus {
    pub fn is_complete(&self) -> bool {
        self.current_total == 100
    }
}
