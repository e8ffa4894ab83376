use chrono::{DateTime, Utc};

use crate::models::courses::entities::PenaltyPolicy;

/// 校验截止时间：软截止时间不早于现在，且不晚于硬截止时间
pub fn validate_deadlines(
    soft_deadline: Option<DateTime<Utc>>,
    hard_deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), &'static str> {
    if let Some(soft) = soft_deadline
        && soft < now
    {
        return Err("Soft deadline must not be in the past");
    }
    validate_deadline_order(soft_deadline, hard_deadline)
}

/// 仅校验先后顺序：soft <= hard
pub fn validate_deadline_order(
    soft_deadline: Option<DateTime<Utc>>,
    hard_deadline: Option<DateTime<Utc>>,
) -> Result<(), &'static str> {
    if let (Some(soft), Some(hard)) = (soft_deadline, hard_deadline)
        && soft > hard
    {
        return Err("Soft deadline must be earlier than or equal to the hard deadline");
    }
    Ok(())
}

/// 校验惩罚参数：0 <= k <= m <= 100
pub fn validate_penalty_params(policy: &PenaltyPolicy) -> Result<(), &'static str> {
    let k = policy.k_percent_per_24h;
    let m = policy.max_m_percent;
    if !(0.0..=100.0).contains(&k) {
        return Err("Penalty K% must be within 0-100");
    }
    if !(0.0..=100.0).contains(&m) {
        return Err("Maximum penalty M% must be within 0-100");
    }
    if k > m {
        return Err("Penalty K% must not exceed the maximum penalty M%");
    }
    Ok(())
}

/// 校验单个阶段权重范围
pub fn validate_weight(weight_percent: i32) -> Result<(), &'static str> {
    if !(0..=100).contains(&weight_percent) {
        return Err("Stage weight must be within 0-100");
    }
    Ok(())
}

/// 校验调整后的权重总和不超过 100%
pub fn validate_weight_total(other_stages_total: i32, weight_percent: i32) -> Result<(), String> {
    let total = other_stages_total + weight_percent;
    if total > 100 {
        return Err(format!(
            "Stage weight {weight_percent}% exceeds the limit. Current total: {other_stages_total}%, remaining: {}%",
            100 - other_stages_total
        ));
    }
    Ok(())
}
