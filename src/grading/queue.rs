//! 评分队列投影
//!
//! 队列行只由这里的纯函数写入，存储层负责在事务中读取旧行、调用投影并按版本号写回。

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::penalty::{self, PenaltyAssessment};
use crate::models::{
    courses::entities::{PenaltyPolicy, Stage, Task},
    exemptions::entities::StageExemption,
    grades::entities::Grade,
    grading_queue::entities::GradingQueueEntry,
    revisions::entities::{Revision, RevisionStatus},
};

/// 生效的截止时间与惩罚策略（阶段默认值被豁免覆盖）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveDeadlines {
    pub soft_deadline: Option<DateTime<Utc>>,
    pub hard_deadline: Option<DateTime<Utc>>,
    pub allow_after_hard: bool,
    pub policy: PenaltyPolicy,
}

impl EffectiveDeadlines {
    pub fn resolve(stage: &Stage, exemption: Option<&StageExemption>) -> Self {
        Self {
            soft_deadline: exemption
                .and_then(|e| e.custom_soft)
                .or(stage.soft_deadline),
            hard_deadline: exemption
                .and_then(|e| e.custom_hard)
                .or(stage.hard_deadline),
            allow_after_hard: exemption.is_some_and(|e| e.allow_after_hard),
            policy: stage.penalty,
        }
    }

    pub fn assess(&self, submitted_at: DateTime<Utc>) -> PenaltyAssessment {
        penalty::assess(
            self.soft_deadline,
            self.hard_deadline,
            submitted_at,
            self.allow_after_hard,
            self.policy,
        )
    }

    fn stamp(&self, entry: &mut GradingQueueEntry) {
        let assessment = self.assess(entry.last_submitted_at);
        entry.soft_deadline = self.soft_deadline;
        entry.hard_deadline = self.hard_deadline;
        entry.late_days_started = assessment.late_days_started;
        entry.penalty_percent_applied = assessment.penalty_percent;
    }
}

/// 提交事件所需的上下文
#[derive(Debug, Clone)]
pub struct SubmissionContext<'a> {
    pub revision: &'a Revision,
    pub stage: &'a Stage,
    pub task: &'a Task,
    pub exemption: Option<&'a StageExemption>,
    pub album_number: Option<String>,
    pub student_name: Option<String>,
}

/// 评分事件的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeOutcome {
    pub revision_id: i64,
    pub points_brutto: f64,
    pub points_netto: f64,
    pub status: RevisionStatus,
    pub penalty_waived: bool,
}

/// 新提交：覆盖最后修订、截止时间与惩罚字段并标记待评分，分数字段保持不变
pub fn on_submission(
    existing: Option<GradingQueueEntry>,
    ctx: &SubmissionContext<'_>,
) -> GradingQueueEntry {
    let revision = ctx.revision;
    let mut entry = existing.unwrap_or_else(|| GradingQueueEntry {
        artifact_id: revision.artifact_id,
        student_id: revision.student_id,
        stage_id: ctx.stage.id,
        task_id: ctx.task.id,
        course_id: ctx.task.course_id,
        album_number: None,
        student_name: None,
        last_revision_id: revision.id,
        last_revision_status: revision.status,
        last_submitted_at: revision.created_at,
        soft_deadline: None,
        hard_deadline: None,
        late_days_started: 0,
        penalty_percent_applied: 0.0,
        penalty_waived: false,
        last_points_brutto: None,
        last_points_netto: None,
        last_accepted_revision_id: None,
        last_accepted_points_netto: None,
        flag_new_submission: true,
        version: 0,
    });

    entry.stage_id = ctx.stage.id;
    entry.task_id = ctx.task.id;
    entry.course_id = ctx.task.course_id;
    entry.album_number = ctx.album_number.clone();
    entry.student_name = ctx.student_name.clone();
    entry.last_revision_id = revision.id;
    entry.last_revision_status = revision.status;
    entry.last_submitted_at = revision.created_at;
    entry.penalty_waived = false;
    entry.flag_new_submission = true;
    EffectiveDeadlines::resolve(ctx.stage, ctx.exemption).stamp(&mut entry);

    entry
}

/// 评分：仅当评分对象是当前修订时更新，返回是否发生更新
pub fn on_grade_assigned(entry: &mut GradingQueueEntry, outcome: &GradeOutcome) -> bool {
    if entry.last_revision_id != outcome.revision_id {
        return false;
    }

    entry.last_points_brutto = Some(outcome.points_brutto);
    entry.last_points_netto = Some(outcome.points_netto);
    entry.last_revision_status = outcome.status;
    entry.penalty_waived = outcome.penalty_waived;
    entry.flag_new_submission = false;
    if outcome.status == RevisionStatus::Accepted {
        entry.last_accepted_revision_id = Some(outcome.revision_id);
        entry.last_accepted_points_netto = Some(outcome.points_netto);
    }
    true
}

/// 豁免或阶段策略变更后重算：更新截止时间、惩罚，已评分时同步净分；不改状态与原始分
pub fn recompute(entry: &mut GradingQueueEntry, deadlines: &EffectiveDeadlines, task: &Task) {
    deadlines.stamp(entry);

    let Some(brutto) = entry.last_points_brutto else {
        return;
    };
    let netto = penalty::net_points(
        task,
        brutto,
        entry.penalty_percent_applied,
        entry.penalty_waived,
    );
    entry.last_points_netto = Some(netto);

    // 当前修订仍处于通过状态时，汇总使用的净分随之更新
    if entry.last_revision_status == RevisionStatus::Accepted
        && entry.last_accepted_revision_id == Some(entry.last_revision_id)
    {
        entry.last_accepted_points_netto = Some(netto);
    }
}

/// 取 (created_at, id) 最大的评分
pub fn latest_grade(grades: &[Grade]) -> Option<&Grade> {
    grades.iter().max_by_key(|g| (g.created_at, g.id))
}

/// 从修订与评分历史完整重建一行，无修订时返回 None
///
/// 最后一次通过：所有 ACCEPTED 评分中最新的一条，且评分时其修订仍是当前修订。
pub fn rebuild(
    stage: &Stage,
    task: &Task,
    exemption: Option<&StageExemption>,
    album_number: Option<String>,
    student_name: Option<String>,
    revisions: &[Revision],
    grades_by_revision: &HashMap<i64, Vec<Grade>>,
) -> Option<GradingQueueEntry> {
    let mut ordered: Vec<&Revision> = revisions.iter().collect();
    ordered.sort_by_key(|r| (r.created_at, r.id));
    let last = *ordered.last()?;

    let ctx = SubmissionContext {
        revision: last,
        stage,
        task,
        exemption,
        album_number,
        student_name,
    };
    let mut entry = on_submission(None, &ctx);
    entry.last_revision_status = last.status;

    let no_grades = Vec::new();
    let last_grades = grades_by_revision.get(&last.id).unwrap_or(&no_grades);
    if let Some(grade) = latest_grade(last_grades) {
        entry.penalty_waived = grade.penalty_skipped;
        entry.last_points_brutto = Some(grade.points_brutto);
        entry.last_points_netto = Some(penalty::net_points(
            task,
            grade.points_brutto,
            entry.penalty_percent_applied,
            grade.penalty_skipped,
        ));
        entry.flag_new_submission = false;
    }

    // 某修订在 t 时刻是否为当前修订
    let current_at = |revision: &Revision, at: DateTime<Utc>| {
        !ordered.iter().any(|other| {
            other.id != revision.id
                && (other.created_at, other.id) > (revision.created_at, revision.id)
                && other.created_at <= at
        })
    };

    let last_accepted = ordered
        .iter()
        .copied()
        .flat_map(|revision| {
            grades_by_revision
                .get(&revision.id)
                .into_iter()
                .flatten()
                .filter(move |g| {
                    g.status_after_grade == RevisionStatus::Accepted
                        && current_at(revision, g.created_at)
                })
                .map(move |g| (revision, g))
        })
        .max_by_key(|(_, g)| (g.created_at, g.id));

    if let Some((revision, grade)) = last_accepted {
        entry.last_accepted_revision_id = Some(revision.id);
        let still_accepted_current =
            revision.id == last.id && entry.last_revision_status == RevisionStatus::Accepted;
        entry.last_accepted_points_netto = if still_accepted_current {
            entry.last_points_netto
        } else {
            Some(grade.points_netto)
        };
    }

    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::GradingMode;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn stage() -> Stage {
        Stage {
            id: 10,
            task_id: 20,
            name: "Stage".into(),
            weight_percent: 100,
            soft_deadline: Some(t0()),
            hard_deadline: Some(t0() + Duration::days(2)),
            penalty: PenaltyPolicy {
                k_percent_per_24h: 5.0,
                max_m_percent: 50.0,
            },
        }
    }

    fn task() -> Task {
        Task {
            id: 20,
            course_id: 30,
            title: "Task".into(),
            grading_mode: GradingMode::Percent,
            max_points: None,
            created_at: t0() - Duration::days(30),
        }
    }

    fn revision(id: i64, at: DateTime<Utc>, status: RevisionStatus) -> Revision {
        Revision {
            id,
            artifact_id: 1,
            student_id: 2,
            file_key: format!("key-{id}"),
            original_file_name: "work.pdf".into(),
            mime_type: None,
            size_bytes: None,
            status,
            comment: None,
            created_at: at,
        }
    }

    fn grade(id: i64, revision_id: i64, brutto: f64, netto: f64, status: RevisionStatus, at: DateTime<Utc>) -> Grade {
        Grade {
            id,
            revision_id,
            teacher_id: 99,
            points_brutto: brutto,
            points_netto: netto,
            penalty_skipped: false,
            status_after_grade: status,
            comment: None,
            created_at: at,
        }
    }

    fn submit(existing: Option<GradingQueueEntry>, rev: &Revision, exemption: Option<&StageExemption>) -> GradingQueueEntry {
        let (stage, task) = (stage(), task());
        let ctx = SubmissionContext {
            revision: rev,
            stage: &stage,
            task: &task,
            exemption,
            album_number: Some("s1234".into()),
            student_name: Some("Ada Lovelace".into()),
        };
        on_submission(existing, &ctx)
    }

    #[test]
    fn test_submission_computes_penalty_and_flags() {
        let rev = revision(1, t0() + Duration::hours(25), RevisionStatus::Submitted);
        let entry = submit(None, &rev, None);
        assert_eq!(entry.late_days_started, 2);
        assert_eq!(entry.penalty_percent_applied, 10.0);
        assert!(entry.flag_new_submission);
        assert_eq!(entry.last_points_brutto, None);
        assert_eq!(entry.course_id, 30);
    }

    #[test]
    fn test_submission_is_idempotent() {
        let rev = revision(1, t0() + Duration::hours(25), RevisionStatus::Submitted);
        let once = submit(None, &rev, None);
        let twice = submit(Some(once.clone()), &rev, None);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_resubmission_keeps_points_until_graded() {
        let first = revision(1, t0(), RevisionStatus::Submitted);
        let mut entry = submit(None, &first, None);
        on_grade_assigned(
            &mut entry,
            &GradeOutcome {
                revision_id: 1,
                points_brutto: 50.0,
                points_netto: 50.0,
                status: RevisionStatus::NeedsFix,
                penalty_waived: false,
            },
        );
        let second = revision(2, t0() + Duration::hours(1), RevisionStatus::Submitted);
        let entry = submit(Some(entry), &second, None);
        assert_eq!(entry.last_revision_id, 2);
        assert_eq!(entry.last_points_brutto, Some(50.0));
        assert!(entry.flag_new_submission);
    }

    #[test]
    fn test_grade_for_other_revision_is_ignored() {
        let rev = revision(1, t0(), RevisionStatus::Submitted);
        let mut entry = submit(None, &rev, None);
        let updated = on_grade_assigned(
            &mut entry,
            &GradeOutcome {
                revision_id: 7,
                points_brutto: 10.0,
                points_netto: 10.0,
                status: RevisionStatus::Accepted,
                penalty_waived: false,
            },
        );
        assert!(!updated);
        assert_eq!(entry.last_accepted_revision_id, None);
    }

    #[test]
    fn test_recompute_with_exemption_fixes_penalty() {
        let rev = revision(1, t0() + Duration::days(3), RevisionStatus::Submitted);
        let mut entry = submit(None, &rev, None);
        assert_eq!(entry.penalty_percent_applied, 100.0);
        on_grade_assigned(
            &mut entry,
            &GradeOutcome {
                revision_id: 1,
                points_brutto: 80.0,
                points_netto: 0.0,
                status: RevisionStatus::Accepted,
                penalty_waived: false,
            },
        );

        let exemption = StageExemption {
            id: 1,
            stage_id: 10,
            student_id: 2,
            allow_after_hard: true,
            custom_soft: None,
            custom_hard: None,
            teacher_id: 99,
            reason: Some("illness".into()),
            created_at: t0(),
        };
        recompute(
            &mut entry,
            &EffectiveDeadlines::resolve(&stage(), Some(&exemption)),
            &task(),
        );
        assert_eq!(entry.penalty_percent_applied, 10.0);
        assert_eq!(entry.last_points_brutto, Some(80.0));
        assert_eq!(entry.last_points_netto, Some(72.0));
        assert_eq!(entry.last_accepted_points_netto, Some(72.0));
        assert_eq!(entry.last_revision_status, RevisionStatus::Accepted);
    }

    #[test]
    fn test_recompute_ungraded_only_touches_penalty() {
        let rev = revision(1, t0() + Duration::hours(25), RevisionStatus::Submitted);
        let mut entry = submit(None, &rev, None);
        let exemption = StageExemption {
            id: 1,
            stage_id: 10,
            student_id: 2,
            allow_after_hard: false,
            custom_soft: Some(t0() + Duration::days(1) + Duration::hours(2)),
            custom_hard: None,
            teacher_id: 99,
            reason: None,
            created_at: t0(),
        };
        recompute(
            &mut entry,
            &EffectiveDeadlines::resolve(&stage(), Some(&exemption)),
            &task(),
        );
        assert_eq!(entry.penalty_percent_applied, 0.0);
        assert_eq!(entry.soft_deadline, exemption.custom_soft);
        assert_eq!(entry.hard_deadline, stage().hard_deadline);
        assert_eq!(entry.last_points_netto, None);
        assert!(entry.flag_new_submission);
    }

    #[test]
    fn test_rebuild_matches_incremental_projection() {
        let first = revision(1, t0() - Duration::hours(1), RevisionStatus::Accepted);
        let second = revision(2, t0() + Duration::hours(25), RevisionStatus::Accepted);
        let g1 = grade(1, 1, 90.0, 90.0, RevisionStatus::Accepted, t0());
        let g2 = grade(2, 2, 80.0, 72.0, RevisionStatus::Accepted, t0() + Duration::days(2));

        let mut incremental = submit(None, &revision(1, first.created_at, RevisionStatus::Submitted), None);
        on_grade_assigned(
            &mut incremental,
            &GradeOutcome {
                revision_id: 1,
                points_brutto: 90.0,
                points_netto: 90.0,
                status: RevisionStatus::Accepted,
                penalty_waived: false,
            },
        );
        let mut incremental = submit(
            Some(incremental),
            &revision(2, second.created_at, RevisionStatus::Submitted),
            None,
        );
        on_grade_assigned(
            &mut incremental,
            &GradeOutcome {
                revision_id: 2,
                points_brutto: 80.0,
                points_netto: 72.0,
                status: RevisionStatus::Accepted,
                penalty_waived: false,
            },
        );

        let grades = HashMap::from([(1, vec![g1]), (2, vec![g2])]);
        let rebuilt = rebuild(
            &stage(),
            &task(),
            None,
            Some("s1234".into()),
            Some("Ada Lovelace".into()),
            &[second, first],
            &grades,
        )
        .unwrap();

        assert_eq!(rebuilt, incremental);
        assert_eq!(rebuilt.last_accepted_points_netto, Some(72.0));
    }

    #[test]
    fn test_rebuild_without_revisions_is_none() {
        assert!(rebuild(&stage(), &task(), None, None, None, &[], &HashMap::new()).is_none());
    }
}
