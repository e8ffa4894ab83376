//! 迟交惩罚计算
//!
//! 纯函数：截止时间 + 提交时间 + 策略 → 惩罚百分比；百分比 → 净分。
//! 豁免变更后可以随时确定性地重算。

use chrono::{DateTime, Utc};

use crate::models::courses::entities::{PenaltyPolicy, Task};

pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// 一次提交的迟交评估结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyAssessment {
    // 已开始的迟交天数（不足 24 小时按一天计）
    pub late_days_started: i32,
    pub penalty_percent: f64,
}

impl PenaltyAssessment {
    pub const ON_TIME: PenaltyAssessment = PenaltyAssessment {
        late_days_started: 0,
        penalty_percent: 0.0,
    };
}

/// 评估迟交情况
///
/// - 无软截止时间或在软截止时间前（含）提交：不扣分
/// - 超过硬截止时间且未豁免：扣 100%
/// - 超过硬截止时间但允许迟交：按硬截止时间计算迟交时长
/// - 其余：`min(ceil(迟交分钟 / 1440) * k, m)`
pub fn assess(
    soft_deadline: Option<DateTime<Utc>>,
    hard_deadline: Option<DateTime<Utc>>,
    submitted_at: DateTime<Utc>,
    allow_after_hard: bool,
    policy: PenaltyPolicy,
) -> PenaltyAssessment {
    let Some(soft) = soft_deadline else {
        return PenaltyAssessment::ON_TIME;
    };
    if submitted_at <= soft {
        return PenaltyAssessment::ON_TIME;
    }

    let mut effective_submitted_at = submitted_at;
    let mut beyond_hard = false;
    if let Some(hard) = hard_deadline
        && submitted_at > hard
    {
        if allow_after_hard {
            effective_submitted_at = hard;
        } else {
            beyond_hard = true;
        }
    }

    // 只计整分钟
    let late_minutes = (effective_submitted_at - soft).num_minutes().max(0);
    let late_days_started = (late_minutes + MINUTES_PER_DAY - 1) / MINUTES_PER_DAY;

    let penalty_percent = if beyond_hard {
        100.0
    } else {
        (late_days_started as f64 * policy.k_percent_per_24h).min(policy.max_m_percent)
    };

    PenaltyAssessment {
        late_days_started: i32::try_from(late_days_started).unwrap_or(i32::MAX),
        penalty_percent: penalty_percent.clamp(0.0, 100.0),
    }
}

/// 计算惩罚百分比 [0, 100]
pub fn compute_penalty_percent(
    soft_deadline: Option<DateTime<Utc>>,
    hard_deadline: Option<DateTime<Utc>>,
    submitted_at: DateTime<Utc>,
    allow_after_hard: bool,
    k_percent_per_24h: f64,
    max_m_percent: f64,
) -> f64 {
    assess(
        soft_deadline,
        hard_deadline,
        submitted_at,
        allow_after_hard,
        PenaltyPolicy {
            k_percent_per_24h,
            max_m_percent,
        },
    )
    .penalty_percent
}

/// 应用惩罚：`brutto * max(0, 1 - percent / 100)`，NaN 输入返回 0
pub fn apply_penalty(brutto: f64, penalty_percent: f64) -> f64 {
    if brutto.is_nan() {
        return 0.0;
    }
    let factor = (1.0 - penalty_percent / 100.0).max(0.0);
    brutto * factor
}

/// 计算净分：扣除惩罚（或免除）后按任务评分模式截断
pub fn net_points(task: &Task, brutto: f64, penalty_percent: f64, penalty_waived: bool) -> f64 {
    if penalty_waived {
        return task.cap_points(apply_penalty(brutto, 0.0));
    }
    task.cap_points(apply_penalty(brutto, penalty_percent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::GradingMode;
    use chrono::{Duration, TimeZone};

    fn soft() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn policy(k: f64, m: f64) -> PenaltyPolicy {
        PenaltyPolicy {
            k_percent_per_24h: k,
            max_m_percent: m,
        }
    }

    #[test]
    fn test_no_penalty_before_soft() {
        let p = compute_penalty_percent(
            Some(soft()),
            None,
            soft() - Duration::hours(3),
            false,
            10.0,
            50.0,
        );
        assert_eq!(p, 0.0);
        assert_eq!(
            compute_penalty_percent(Some(soft()), None, soft(), false, 10.0, 50.0),
            0.0
        );
    }

    #[test]
    fn test_no_soft_deadline_means_no_penalty() {
        let p = compute_penalty_percent(None, Some(soft()), soft() + Duration::days(9), false, 10.0, 50.0);
        assert_eq!(p, 0.0);
    }

    #[test]
    fn test_penalty_accumulates_per_started_day() {
        let a = assess(
            Some(soft()),
            Some(soft() + Duration::days(2)),
            soft() + Duration::hours(25),
            false,
            policy(5.0, 50.0),
        );
        assert_eq!(a.late_days_started, 2);
        assert_eq!(a.penalty_percent, 10.0);
        assert_eq!(apply_penalty(80.0, a.penalty_percent), 72.0);
    }

    #[test]
    fn test_one_minute_late_counts_as_a_day() {
        let a = assess(Some(soft()), None, soft() + Duration::minutes(1), false, policy(7.0, 50.0));
        assert_eq!(a.late_days_started, 1);
        assert_eq!(a.penalty_percent, 7.0);
    }

    #[test]
    fn test_penalty_capped() {
        let a = assess(Some(soft()), None, soft() + Duration::days(10), false, policy(15.0, 20.0));
        assert_eq!(a.penalty_percent, 20.0);
        // 天数不由被截断的百分比反推
        assert_eq!(a.late_days_started, 10);
    }

    #[test]
    fn test_after_hard_without_exemption_is_full_penalty() {
        let hard = soft() + Duration::days(2);
        let p = compute_penalty_percent(
            Some(soft()),
            Some(hard),
            hard + Duration::hours(1),
            false,
            10.0,
            50.0,
        );
        assert_eq!(p, 100.0);
    }

    #[test]
    fn test_after_hard_with_exemption_is_clamped_to_hard() {
        let hard = soft() + Duration::days(2);
        let a = assess(
            Some(soft()),
            Some(hard),
            hard + Duration::days(5),
            true,
            policy(10.0, 50.0),
        );
        assert_eq!(a.late_days_started, 2);
        assert_eq!(a.penalty_percent, 20.0);
    }

    #[test]
    fn test_apply_penalty_edges() {
        assert_eq!(apply_penalty(80.0, 25.0), 60.0);
        assert_eq!(apply_penalty(80.0, 0.0), 80.0);
        assert_eq!(apply_penalty(80.0, 100.0), 0.0);
        assert_eq!(apply_penalty(80.0, 150.0), 0.0);
        assert_eq!(apply_penalty(f64::NAN, 10.0), 0.0);
    }

    #[test]
    fn test_net_points_waived_and_capped() {
        let task = Task {
            id: 1,
            course_id: 1,
            title: "t".into(),
            grading_mode: GradingMode::Points10,
            max_points: None,
            created_at: Utc::now(),
        };
        assert_eq!(net_points(&task, 12.0, 50.0, true), 10.0);
        assert_eq!(net_points(&task, 8.0, 50.0, false), 4.0);
    }
}
