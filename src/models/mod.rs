//! 业务数据模型
//!
//! 与 `entity` 模块中的数据库实体分离，服务层与存储层之间只传递这里的类型。

pub mod audit;
pub mod courses;
pub mod exemptions;
pub mod grades;
pub mod grading_queue;
pub mod revisions;
pub mod users;

/// 将 unix 秒时间戳转换为 UTC 时间
pub(crate) fn ts_to_datetime(ts: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::<chrono::Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
