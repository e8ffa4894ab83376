//! 迟交惩罚与修订状态机的性质测试

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_coursework_grading::grading::penalty::{
    MINUTES_PER_DAY, apply_penalty, assess, compute_penalty_percent,
};
use rust_coursework_grading::models::{
    courses::entities::PenaltyPolicy, revisions::entities::RevisionStatus,
};

fn soft() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// k <= m 的合法策略
fn policy() -> impl Strategy<Value = PenaltyPolicy> {
    (0.0f64..=100.0, 0.0f64..=100.0).prop_map(|(a, b)| PenaltyPolicy {
        k_percent_per_24h: a.min(b),
        max_m_percent: a.max(b),
    })
}

fn status() -> impl Strategy<Value = RevisionStatus> {
    prop::sample::select(RevisionStatus::all().to_vec())
}

proptest! {
    /// 惩罚始终落在 [0, 100]
    #[test]
    fn penalty_is_bounded(
        late_minutes in -10_000i64..100_000,
        hard_after in prop::option::of(0i64..20_000),
        allow_after_hard in any::<bool>(),
        policy in policy(),
    ) {
        let hard = hard_after.map(|m| soft() + Duration::minutes(m));
        let p = compute_penalty_percent(
            Some(soft()),
            hard,
            soft() + Duration::minutes(late_minutes),
            allow_after_hard,
            policy.k_percent_per_24h,
            policy.max_m_percent,
        );
        prop_assert!((0.0..=100.0).contains(&p));
    }

    /// 无硬截止时间时等于 min(ceil(分钟 / 1440) * k, m)
    #[test]
    fn penalty_matches_formula_before_hard(
        late_minutes in 1i64..100_000,
        policy in policy(),
    ) {
        let a = assess(Some(soft()), None, soft() + Duration::minutes(late_minutes), false, policy);
        let days = (late_minutes + MINUTES_PER_DAY - 1) / MINUTES_PER_DAY;
        prop_assert_eq!(i64::from(a.late_days_started), days);
        let expected = (days as f64 * policy.k_percent_per_24h).min(policy.max_m_percent);
        prop_assert!((a.penalty_percent - expected).abs() < 1e-9);
    }

    /// 提交越晚惩罚不会减少
    #[test]
    fn penalty_is_monotonic_in_submission_time(
        first in 0i64..50_000,
        delta in 0i64..50_000,
        hard_after in prop::option::of(0i64..40_000),
        allow_after_hard in any::<bool>(),
        policy in policy(),
    ) {
        let hard = hard_after.map(|m| soft() + Duration::minutes(m));
        let earlier = assess(Some(soft()), hard, soft() + Duration::minutes(first), allow_after_hard, policy);
        let later = assess(Some(soft()), hard, soft() + Duration::minutes(first + delta), allow_after_hard, policy);
        prop_assert!(later.penalty_percent >= earlier.penalty_percent);
        prop_assert!(later.late_days_started >= earlier.late_days_started);
    }

    /// 准时提交不扣分
    #[test]
    fn on_time_is_free(early_minutes in 0i64..100_000, policy in policy()) {
        let a = assess(Some(soft()), None, soft() - Duration::minutes(early_minutes), false, policy);
        prop_assert_eq!(a.late_days_started, 0);
        prop_assert_eq!(a.penalty_percent, 0.0);
    }

    /// 净分不超过原始分且不为负
    #[test]
    fn apply_penalty_stays_within_brutto(brutto in 0.0f64..1000.0, percent in -50.0f64..200.0) {
        let netto = apply_penalty(brutto, percent);
        prop_assert!(netto >= 0.0);
        if percent >= 0.0 {
            prop_assert!(netto <= brutto);
        }
        if percent >= 100.0 {
            prop_assert_eq!(netto, 0.0);
        }
    }

    /// 状态转换：成功时返回目标状态，失败时携带 (from, to)
    #[test]
    fn transitions_follow_table(from in status(), to in status()) {
        match from.transition_to(to) {
            Ok(next) => {
                prop_assert_eq!(next, to);
                prop_assert!(from.can_transition_to(to));
            }
            Err(err) => {
                prop_assert_eq!(err.from, from);
                prop_assert_eq!(err.to, to);
                prop_assert!(from != to);
            }
        }
    }

    /// 已评定的修订只能被重新打开为 NEEDS_FIX
    #[test]
    fn decided_revisions_can_only_be_reopened(from in prop::sample::select(vec![RevisionStatus::Accepted, RevisionStatus::Rejected]), to in status()) {
        let allowed = from.can_transition_to(to);
        prop_assert_eq!(allowed, to == from || to == RevisionStatus::NeedsFix);
    }
}
