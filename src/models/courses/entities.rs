use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 课程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 课程选课记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Enrollment {
    pub course_id: i64,
    pub student_id: i64,
    // 学号
    pub album_number: Option<String>,
}

/// 评分模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub enum GradingMode {
    Percent,  // 百分制 0-100
    Points10, // 点数制 0-max_points
}

impl GradingMode {
    pub const PERCENT: &'static str = "PERCENT";
    pub const POINTS10: &'static str = "POINTS10";
}

impl std::fmt::Display for GradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradingMode::Percent => write!(f, "{}", GradingMode::PERCENT),
            GradingMode::Points10 => write!(f, "{}", GradingMode::POINTS10),
        }
    }
}

impl std::str::FromStr for GradingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            GradingMode::PERCENT => Ok(GradingMode::Percent),
            GradingMode::POINTS10 => Ok(GradingMode::Points10),
            _ => Err(format!("Invalid grading mode: {s}")),
        }
    }
}

/// 任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Task {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub grading_mode: GradingMode,
    pub max_points: Option<f64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Task {
    pub const DEFAULT_MAX_POINTS: f64 = 10.0;

    /// 按评分模式截断分数
    pub fn cap_points(&self, value: f64) -> f64 {
        let max = match self.grading_mode {
            GradingMode::Percent => 100.0,
            GradingMode::Points10 => self.max_points.unwrap_or(Self::DEFAULT_MAX_POINTS),
        };
        value.clamp(0.0, max)
    }
}

/// 迟交惩罚策略：每开始一个 24 小时扣 k%，最多扣 m%
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct PenaltyPolicy {
    pub k_percent_per_24h: f64,
    pub max_m_percent: f64,
}

impl Default for PenaltyPolicy {
    fn default() -> Self {
        Self {
            k_percent_per_24h: 0.0,
            max_m_percent: 0.0,
        }
    }
}

/// 阶段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Stage {
    pub id: i64,
    pub task_id: i64,
    pub name: String,
    pub weight_percent: i32,
    pub soft_deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub hard_deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub penalty: PenaltyPolicy,
}

/// 提交物（学生提交的最小单元）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Artifact {
    pub id: i64,
    pub stage_id: i64,
    pub name: String,
    pub max_size_bytes: Option<i64>,
    // 小写、不带点的扩展名，为空表示不限制
    pub allowed_extensions: Vec<String>,
}

impl Artifact {
    /// 校验文件是否符合提交物的大小与扩展名限制
    pub fn check_file(&self, file_name: &str, size_bytes: Option<i64>) -> Result<(), String> {
        if let (Some(max), Some(size)) = (self.max_size_bytes, size_bytes)
            && size > max
        {
            return Err(format!(
                "File size {size} exceeds artifact limit of {max} bytes"
            ));
        }

        if !self.allowed_extensions.is_empty() {
            let ext = file_name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .unwrap_or_default();
            if !self.allowed_extensions.iter().any(|allowed| *allowed == ext) {
                return Err(format!(
                    "File extension '{ext}' is not allowed, expected one of: {}",
                    self.allowed_extensions.join(", ")
                ));
            }
        }

        Ok(())
    }
}
