pub mod audit;
pub mod courses;
pub mod grading;

use std::future::Future;

use tracing::warn;

use crate::errors::Result;

pub use audit::{AuditEvent, AuditSink, StorageAuditSink, TracingAuditSink};
pub use courses::CourseService;
pub use grading::GradingService;

/// 乐观锁冲突时重试整个操作，最多 `retries` 次
pub(crate) async fn retry_on_conflict<T, F, Fut>(retries: u32, operation: &str, mut run: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match run().await {
            Err(e) if e.is_conflict() && attempt < retries => {
                attempt += 1;
                warn!(
                    "{} 遇到并发冲突，第 {} 次重试: {}",
                    operation,
                    attempt,
                    e.message()
                );
            }
            result => return result,
        }
    }
}
