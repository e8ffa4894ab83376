//! 阶段加权汇总
//!
//! 每个阶段取其各提交物"最后一次通过"净分的最大值，乘以阶段权重后求和。
//! 使用的是时间上最后一次通过的修订分数，而不是历史最高分。

use std::collections::HashMap;

use super::queue;
use crate::models::{
    courses::entities::{Stage, Task},
    exemptions::entities::StageExemption,
    grades::entities::Grade,
    grading_queue::{
        entities::GradingQueueEntry,
        responses::{AggregationResult, StageContribution},
    },
    revisions::entities::Revision,
};

/// 阶段及其提交物
#[derive(Debug, Clone)]
pub struct StageArtifacts {
    pub stage: Stage,
    pub artifact_ids: Vec<i64>,
}

/// 从队列行中取出每个提交物最后一次通过的净分
pub fn accepted_points_from_queue(entries: &[GradingQueueEntry]) -> HashMap<i64, f64> {
    entries
        .iter()
        .filter_map(|e| e.last_accepted_points_netto.map(|p| (e.artifact_id, p)))
        .collect()
}

/// 回放历史得到提交物最后一次通过的净分
///
/// 与重建队列行共用同一规则：最新的 ACCEPTED 评分事件，且评分时其修订仍是当前修订。
/// 修订随后被重新打回不会让结果退回更早的通过记录。
pub fn last_accepted_from_history(
    stage: &Stage,
    task: &Task,
    exemption: Option<&StageExemption>,
    revisions: &[Revision],
    grades_by_revision: &HashMap<i64, Vec<Grade>>,
) -> Option<f64> {
    queue::rebuild(
        stage,
        task,
        exemption,
        None,
        None,
        revisions,
        grades_by_revision,
    )?
    .last_accepted_points_netto
}

/// 汇总一个学生在任务上的加权得分
pub fn aggregate(
    stages: &[StageArtifacts],
    accepted_points: &HashMap<i64, f64>,
) -> (AggregationResult, Vec<StageContribution>) {
    let mut weighted = 0.0;
    let mut weight_total = 0;
    let mut contributions = Vec::with_capacity(stages.len());

    for item in stages {
        let best = item
            .artifact_ids
            .iter()
            .filter_map(|id| accepted_points.get(id).copied())
            .fold(0.0_f64, f64::max);
        let stage_points = best * item.stage.weight_percent as f64 / 100.0;

        weighted += stage_points;
        weight_total += item.stage.weight_percent;
        contributions.push(StageContribution {
            stage_id: item.stage.id,
            weight_percent: item.stage.weight_percent,
            accepted_points: best,
            weighted_points: stage_points,
        });
    }

    (
        AggregationResult {
            points: weighted,
            weight_total,
        },
        contributions,
    )
}
