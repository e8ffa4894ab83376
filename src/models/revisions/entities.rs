use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 修订状态
///
/// 合法转换：
/// - SUBMITTED -> NEEDS_FIX / ACCEPTED / REJECTED
/// - NEEDS_FIX -> SUBMITTED（重新提交）
/// - ACCEPTED / REJECTED -> NEEDS_FIX（重新打开）
/// - 任意状态 -> 自身（不改状态的重新评分）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/revision.ts")]
pub enum RevisionStatus {
    Submitted,
    NeedsFix,
    Accepted,
    Rejected,
}

impl RevisionStatus {
    pub const SUBMITTED: &'static str = "SUBMITTED";
    pub const NEEDS_FIX: &'static str = "NEEDS_FIX";
    pub const ACCEPTED: &'static str = "ACCEPTED";
    pub const REJECTED: &'static str = "REJECTED";

    pub fn all() -> &'static [RevisionStatus] {
        &[
            RevisionStatus::Submitted,
            RevisionStatus::NeedsFix,
            RevisionStatus::Accepted,
            RevisionStatus::Rejected,
        ]
    }

    /// 转换表
    pub fn can_transition_to(self, target: RevisionStatus) -> bool {
        use RevisionStatus::*;

        match (self, target) {
            (from, to) if from == to => true,
            (Submitted, NeedsFix | Accepted | Rejected) => true,
            (NeedsFix, Submitted) => true,
            (Accepted | Rejected, NeedsFix) => true,
            _ => false,
        }
    }

    /// 执行状态转换，返回新状态
    pub fn transition_to(self, target: RevisionStatus) -> Result<RevisionStatus, InvalidTransition> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(InvalidTransition {
                from: self,
                to: target,
            })
        }
    }
}

impl std::fmt::Display for RevisionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevisionStatus::Submitted => write!(f, "{}", RevisionStatus::SUBMITTED),
            RevisionStatus::NeedsFix => write!(f, "{}", RevisionStatus::NEEDS_FIX),
            RevisionStatus::Accepted => write!(f, "{}", RevisionStatus::ACCEPTED),
            RevisionStatus::Rejected => write!(f, "{}", RevisionStatus::REJECTED),
        }
    }
}

impl std::str::FromStr for RevisionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            RevisionStatus::SUBMITTED => Ok(RevisionStatus::Submitted),
            RevisionStatus::NEEDS_FIX => Ok(RevisionStatus::NeedsFix),
            RevisionStatus::ACCEPTED => Ok(RevisionStatus::Accepted),
            RevisionStatus::REJECTED => Ok(RevisionStatus::Rejected),
            _ => Err(format!("Invalid revision status: {s}")),
        }
    }
}

/// 非法状态转换，携带尝试的 (from, to)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: RevisionStatus,
    pub to: RevisionStatus,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid revision status transition: {} -> {}",
            self.from, self.to
        )
    }
}

impl std::error::Error for InvalidTransition {}

/// 学生针对某个提交物的一次修订
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/revision.ts")]
pub struct Revision {
    pub id: i64,
    pub artifact_id: i64,
    pub student_id: i64,
    // 文件存储键（上传由外部完成）
    pub file_key: String,
    pub original_file_name: String,
    pub mime_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub status: RevisionStatus,
    pub comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
