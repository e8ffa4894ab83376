use std::collections::HashMap;

use tracing::{debug, warn};

use super::GradingService;
use crate::errors::{GradingError, Result};
use crate::grading::aggregation::{
    self, StageArtifacts, accepted_points_from_queue, last_accepted_from_history,
};
use crate::models::courses::entities::Task;
use crate::models::grading_queue::responses::{AggregationBreakdown, AggregationResult};

/// 载入任务的阶段及其提交物
async fn load_stage_artifacts(
    service: &GradingService,
    task_id: i64,
) -> Result<(Task, Vec<StageArtifacts>)> {
    let storage = service.storage();
    let task = storage
        .find_task(task_id)
        .await?
        .ok_or_else(|| GradingError::not_found(format!("Task {task_id} not found")))?;

    let mut items = Vec::new();
    for stage in storage.list_stages_by_task(task_id).await? {
        let artifact_ids = storage
            .list_artifacts_by_stage(stage.id)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();
        items.push(StageArtifacts {
            stage,
            artifact_ids,
        });
    }
    Ok((task, items))
}

/// 基于评分队列的汇总
pub async fn aggregate_task_breakdown(
    service: &GradingService,
    task_id: i64,
    student_id: i64,
) -> Result<AggregationBreakdown> {
    let (_, stages) = load_stage_artifacts(service, task_id).await?;
    let entries = service
        .storage()
        .list_queue_by_task_student(task_id, student_id)
        .await?;
    let accepted = accepted_points_from_queue(&entries);

    let (result, contributions) = aggregation::aggregate(&stages, &accepted);
    if result.weight_total != 100 {
        warn!(
            "任务 {} 的阶段权重之和为 {}%，汇总结果可能不完整",
            task_id, result.weight_total
        );
    }
    debug!(
        "任务 {} 学生 {} 汇总: {} (权重 {}%)",
        task_id, student_id, result.points, result.weight_total
    );

    Ok(AggregationBreakdown {
        task_id,
        student_id,
        result,
        stages: contributions,
    })
}

/// 回放修订与评分历史的汇总，与队列汇总互相校验
pub async fn aggregate_task_from_history(
    service: &GradingService,
    task_id: i64,
    student_id: i64,
) -> Result<AggregationResult> {
    let storage = service.storage();
    let (task, stages) = load_stage_artifacts(service, task_id).await?;

    let mut accepted = HashMap::new();
    for item in &stages {
        let exemption = storage.find_exemption(item.stage.id, student_id).await?;
        for &artifact_id in &item.artifact_ids {
            let revisions = storage.list_revisions(artifact_id, student_id).await?;
            if revisions.is_empty() {
                continue;
            }
            let revision_ids: Vec<i64> = revisions.iter().map(|r| r.id).collect();
            let mut grades_by_revision: HashMap<i64, Vec<_>> = HashMap::new();
            for grade in storage.list_grades_by_revisions(&revision_ids).await? {
                grades_by_revision
                    .entry(grade.revision_id)
                    .or_default()
                    .push(grade);
            }
            if let Some(points) = last_accepted_from_history(
                &item.stage,
                &task,
                exemption.as_ref(),
                &revisions,
                &grades_by_revision,
            ) {
                accepted.insert(artifact_id, points);
            }
        }
    }

    Ok(aggregation::aggregate(&stages, &accepted).0)
}
