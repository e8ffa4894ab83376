use serde::Serialize;
use ts_rs::TS;

/// 任务加权汇总结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading_queue.ts")]
pub struct AggregationResult {
    // 加权后的净分
    pub points: f64,
    // 实际遍历到的阶段权重之和，正常应为 100
    pub weight_total: i32,
}

/// 单个阶段对汇总的贡献
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading_queue.ts")]
pub struct StageContribution {
    pub stage_id: i64,
    pub weight_percent: i32,
    // 该阶段各提交物最后一次通过的净分中的最大值
    pub accepted_points: f64,
    pub weighted_points: f64,
}

/// 汇总明细
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading_queue.ts")]
pub struct AggregationBreakdown {
    pub task_id: i64,
    pub student_id: i64,
    pub result: AggregationResult,
    pub stages: Vec<StageContribution>,
}

/// 队列重建统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading_queue.ts")]
pub struct RebuildReport {
    pub rebuilt: usize,
    pub failed: usize,
}
