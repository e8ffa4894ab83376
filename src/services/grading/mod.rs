//! 评分服务
//!
//! 提交、评分、豁免都委托给存储层的单事务操作；乐观锁冲突时整体重试。

pub mod aggregate;
pub mod exemption;
pub mod grade;
pub mod history;
pub mod queue;
pub mod rebuild;
pub mod submit;

use std::future::Future;
use std::sync::Arc;

use crate::config::GradingConfig;
use crate::errors::Result;
use crate::models::{
    exemptions::{entities::StageExemption, requests::UpsertExemptionRequest},
    grades::{entities::Grade, requests::GradeRevisionRequest},
    grading_queue::{
        entities::GradingQueueEntry,
        requests::QueueListQuery,
        responses::{AggregationBreakdown, AggregationResult, RebuildReport},
    },
    revisions::{
        entities::Revision, requests::SubmitRevisionRequest, responses::RevisionHistoryResponse,
    },
};
use crate::services::audit::AuditSink;
use crate::storage::Storage;
use crate::utils::Clock;

pub struct GradingService {
    storage: Arc<dyn Storage>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    conflict_retries: u32,
}

impl GradingService {
    pub fn new(storage: Arc<dyn Storage>, audit: Arc<dyn AuditSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            audit,
            clock,
            conflict_retries: GradingConfig::default().conflict_retries,
        }
    }

    pub fn with_config(mut self, config: &GradingConfig) -> Self {
        self.conflict_retries = config.conflict_retries;
        self
    }

    pub(crate) fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub(crate) fn audit(&self) -> &dyn AuditSink {
        self.audit.as_ref()
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// 冲突时重试整个操作
    pub(crate) async fn retry_on_conflict<T, F, Fut>(&self, operation: &str, run: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        crate::services::retry_on_conflict(self.conflict_retries, operation, run).await
    }

    // 学生提交修订
    pub async fn submit_revision(
        &self,
        student_id: i64,
        request: SubmitRevisionRequest,
    ) -> Result<Revision> {
        submit::submit_revision(self, student_id, request).await
    }

    // 教师评分
    pub async fn grade_revision(
        &self,
        teacher_id: i64,
        request: GradeRevisionRequest,
    ) -> Result<Grade> {
        grade::grade_revision(self, teacher_id, request).await
    }

    // 新增或覆盖豁免，并重算该学生在阶段内的队列行
    pub async fn upsert_exemption(
        &self,
        teacher_id: i64,
        request: UpsertExemptionRequest,
    ) -> Result<StageExemption> {
        exemption::upsert_exemption(self, teacher_id, request).await
    }

    // 任务加权汇总
    pub async fn aggregate_task(&self, task_id: i64, student_id: i64) -> Result<AggregationResult> {
        Ok(aggregate::aggregate_task_breakdown(self, task_id, student_id)
            .await?
            .result)
    }

    // 任务加权汇总（含各阶段明细）
    pub async fn aggregate_task_breakdown(
        &self,
        task_id: i64,
        student_id: i64,
    ) -> Result<AggregationBreakdown> {
        aggregate::aggregate_task_breakdown(self, task_id, student_id).await
    }

    // 从修订与评分历史回放汇总
    pub async fn aggregate_task_from_history(
        &self,
        task_id: i64,
        student_id: i64,
    ) -> Result<AggregationResult> {
        aggregate::aggregate_task_from_history(self, task_id, student_id).await
    }

    pub async fn get_queue_entry(
        &self,
        artifact_id: i64,
        student_id: i64,
    ) -> Result<Option<GradingQueueEntry>> {
        queue::get_queue_entry(self, artifact_id, student_id).await
    }

    pub async fn list_stage_queue(
        &self,
        stage_id: i64,
        query: QueueListQuery,
    ) -> Result<Vec<GradingQueueEntry>> {
        queue::list_stage_queue(self, stage_id, query).await
    }

    // 修订历史（最新在前）
    pub async fn revision_history(
        &self,
        artifact_id: i64,
        student_id: i64,
    ) -> Result<RevisionHistoryResponse> {
        history::revision_history(self, artifact_id, student_id).await
    }

    pub async fn rebuild_queue_entry(
        &self,
        artifact_id: i64,
        student_id: i64,
    ) -> Result<Option<GradingQueueEntry>> {
        rebuild::rebuild_queue_entry(self, artifact_id, student_id).await
    }

    pub async fn rebuild_all(&self) -> Result<RebuildReport> {
        rebuild::rebuild_all(self).await
    }
}
