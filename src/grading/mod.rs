//! 评分流水线核心
//!
//! - `penalty`: 迟交惩罚计算
//! - `queue`: 评分队列投影（提交、评分、重算、重建）
//! - `aggregation`: 阶段加权汇总
//!
//! 修订状态机见 `models::revisions::entities::RevisionStatus`。
//! 这里只有纯函数，不访问存储。

pub mod aggregation;
pub mod penalty;
pub mod queue;

pub use aggregation::{StageArtifacts, aggregate};
pub use penalty::{PenaltyAssessment, apply_penalty, compute_penalty_percent};
pub use queue::{EffectiveDeadlines, GradeOutcome, SubmissionContext};
