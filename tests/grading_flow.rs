mod common;

use chrono::Duration;
use common::{Fixture, RecordingAuditSink, TEACHER, grading, submission, t0};
use rust_coursework_grading::models::{
    audit::entities::AuditEventType,
    courses::{entities::PenaltyPolicy, requests::UpdateStageRequest},
    exemptions::requests::UpsertExemptionRequest,
    revisions::entities::RevisionStatus,
};

#[tokio::test]
async fn test_late_submission_is_penalized_per_started_day() {
    let fx = Fixture::new().await;
    let student = fx.student("Ewa", "S1-001").await;
    let stage = fx
        .stage(
            "Report",
            100,
            Some(t0() + Duration::days(1)),
            Some(t0() + Duration::days(3)),
            5.0,
            50.0,
        )
        .await;
    let artifact = fx.artifact(stage.id, "report").await;

    fx.clock.set(t0() + Duration::days(1) + Duration::hours(25));
    let revision = fx.submit(student, artifact.id).await;
    assert_eq!(revision.status, RevisionStatus::Submitted);

    let entry = fx
        .grading
        .get_queue_entry(artifact.id, student)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.late_days_started, 2);
    assert_eq!(entry.penalty_percent_applied, 10.0);
    assert!(entry.flag_new_submission);
    assert_eq!(entry.album_number.as_deref(), Some("S1-001"));
    assert_eq!(entry.student_name.as_deref(), Some("Ewa Kowalski"));
    assert_eq!(entry.version, 1);

    let grade = fx.grade(revision.id, 80.0, RevisionStatus::Accepted).await;
    assert_eq!(grade.points_brutto, 80.0);
    assert_eq!(grade.points_netto, 72.0);

    let entry = fx
        .grading
        .get_queue_entry(artifact.id, student)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.last_revision_status, RevisionStatus::Accepted);
    assert_eq!(entry.last_points_netto, Some(72.0));
    assert_eq!(entry.last_accepted_revision_id, Some(revision.id));
    assert_eq!(entry.last_accepted_points_netto, Some(72.0));
    assert!(!entry.flag_new_submission);
    assert_eq!(entry.version, 2);

    let result = fx.grading.aggregate_task(fx.task.id, student).await.unwrap();
    assert_eq!(result.points, 72.0);
    assert_eq!(result.weight_total, 100);
}

#[tokio::test]
async fn test_skip_penalty_keeps_brutto() {
    let fx = Fixture::new().await;
    let student = fx.student("Ewa", "S1-001").await;
    let stage = fx
        .stage("Report", 100, Some(t0() + Duration::days(1)), None, 10.0, 50.0)
        .await;
    let artifact = fx.artifact(stage.id, "report").await;

    fx.clock.set(t0() + Duration::days(4));
    let revision = fx.submit(student, artifact.id).await;
    let mut request = grading(revision.id, 90.0, RevisionStatus::Accepted);
    request.skip_penalty = true;
    let grade = fx.grading.grade_revision(TEACHER, request).await.unwrap();
    assert!(grade.penalty_skipped);
    assert_eq!(grade.points_netto, 90.0);

    let entry = fx
        .grading
        .get_queue_entry(artifact.id, student)
        .await
        .unwrap()
        .unwrap();
    assert!(entry.penalty_waived);
    assert_eq!(entry.penalty_percent_applied, 30.0);
    assert_eq!(entry.last_accepted_points_netto, Some(90.0));
}

#[tokio::test]
async fn test_last_accepted_revision_wins_over_best() {
    let fx = Fixture::new().await;
    let student = fx.student("Ewa", "S1-001").await;
    let first = fx.stage("Design", 60, None, None, 0.0, 0.0).await;
    let second = fx.stage("Implementation", 40, None, None, 0.0, 0.0).await;
    let design = fx.artifact(first.id, "design").await;
    fx.artifact(second.id, "code").await;

    let r1 = fx.submit(student, design.id).await;
    fx.advance_hours(1);
    fx.grade(r1.id, 80.0, RevisionStatus::Accepted).await;

    let result = fx.grading.aggregate_task(fx.task.id, student).await.unwrap();
    assert_eq!(result.points, 48.0);
    assert_eq!(result.weight_total, 100);

    // 新修订待评分时，汇总仍使用上一次通过的分数
    fx.advance_hours(1);
    let r2 = fx.submit(student, design.id).await;
    let entry = fx
        .grading
        .get_queue_entry(design.id, student)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.last_revision_id, r2.id);
    assert!(entry.flag_new_submission);
    assert_eq!(entry.last_points_brutto, Some(80.0));
    assert_eq!(entry.last_accepted_points_netto, Some(80.0));

    fx.advance_hours(1);
    fx.grade(r2.id, 50.0, RevisionStatus::NeedsFix).await;
    let entry = fx
        .grading
        .get_queue_entry(design.id, student)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.last_revision_status, RevisionStatus::NeedsFix);
    assert_eq!(entry.last_points_netto, Some(50.0));
    assert_eq!(entry.last_accepted_revision_id, Some(r1.id));
    assert_eq!(fx.grading.aggregate_task(fx.task.id, student).await.unwrap().points, 48.0);

    fx.advance_hours(1);
    let r3 = fx.submit(student, design.id).await;
    fx.advance_hours(1);
    fx.grade(r3.id, 70.0, RevisionStatus::Accepted).await;

    let breakdown = fx
        .grading
        .aggregate_task_breakdown(fx.task.id, student)
        .await
        .unwrap();
    assert_eq!(breakdown.result.points, 42.0);
    assert_eq!(breakdown.stages.len(), 2);
    assert_eq!(breakdown.stages[0].accepted_points, 70.0);
    assert_eq!(breakdown.stages[1].accepted_points, 0.0);

    let replayed = fx
        .grading
        .aggregate_task_from_history(fx.task.id, student)
        .await
        .unwrap();
    assert_eq!(replayed, breakdown.result);

    // 从历史重建的行与增量维护的行一致（版本号除外）
    let incremental = fx
        .grading
        .get_queue_entry(design.id, student)
        .await
        .unwrap()
        .unwrap();
    let rebuilt = fx
        .grading
        .rebuild_queue_entry(design.id, student)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rebuilt.version, incremental.version + 1);
    assert_eq!(
        rebuilt,
        rust_coursework_grading::models::grading_queue::entities::GradingQueueEntry {
            version: rebuilt.version,
            ..incremental
        }
    );
}

#[tokio::test]
async fn test_reopened_acceptance_still_counts_in_both_aggregates() {
    let fx = Fixture::new().await;
    let student = fx.student("Ewa", "S1-001").await;
    let stage = fx.stage("Design", 100, None, None, 0.0, 0.0).await;
    let artifact = fx.artifact(stage.id, "design").await;

    let r1 = fx.submit(student, artifact.id).await;
    fx.advance_hours(1);
    fx.grade(r1.id, 90.0, RevisionStatus::Accepted).await;
    fx.advance_hours(1);
    let r2 = fx.submit(student, artifact.id).await;
    fx.advance_hours(1);
    fx.grade(r2.id, 70.0, RevisionStatus::Accepted).await;

    // 第二版通过后被打回
    fx.advance_hours(1);
    fx.grade(r2.id, 70.0, RevisionStatus::NeedsFix).await;

    let queue = fx.grading.aggregate_task(fx.task.id, student).await.unwrap();
    assert_eq!(queue.points, 70.0);
    let replayed = fx
        .grading
        .aggregate_task_from_history(fx.task.id, student)
        .await
        .unwrap();
    assert_eq!(replayed, queue);

    let rebuilt = fx
        .grading
        .rebuild_queue_entry(artifact.id, student)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rebuilt.last_revision_status, RevisionStatus::NeedsFix);
    assert_eq!(rebuilt.last_accepted_revision_id, Some(r2.id));
    assert_eq!(rebuilt.last_accepted_points_netto, Some(70.0));
}

#[tokio::test]
async fn test_regrading_superseded_revision_does_not_change_aggregates() {
    let fx = Fixture::new().await;
    let student = fx.student("Ewa", "S1-001").await;
    let stage = fx.stage("Design", 100, None, None, 0.0, 0.0).await;
    let artifact = fx.artifact(stage.id, "design").await;

    let r1 = fx.submit(student, artifact.id).await;
    fx.advance_hours(1);
    fx.grade(r1.id, 60.0, RevisionStatus::Accepted).await;
    fx.advance_hours(1);
    fx.submit(student, artifact.id).await;
    // 第二版提交后再次评定第一版
    fx.advance_hours(1);
    fx.grade(r1.id, 95.0, RevisionStatus::Accepted).await;

    let queue = fx.grading.aggregate_task(fx.task.id, student).await.unwrap();
    assert_eq!(queue.points, 60.0);
    let replayed = fx
        .grading
        .aggregate_task_from_history(fx.task.id, student)
        .await
        .unwrap();
    assert_eq!(replayed, queue);
}

#[tokio::test]
async fn test_grading_superseded_revision_leaves_queue_untouched() {
    let fx = Fixture::new().await;
    let student = fx.student("Ewa", "S1-001").await;
    let stage = fx.stage("Design", 100, None, None, 0.0, 0.0).await;
    let artifact = fx.artifact(stage.id, "design").await;

    let r1 = fx.submit(student, artifact.id).await;
    fx.advance_hours(1);
    let r2 = fx.submit(student, artifact.id).await;
    let before = fx
        .grading
        .get_queue_entry(artifact.id, student)
        .await
        .unwrap()
        .unwrap();

    fx.advance_hours(1);
    let grade = fx.grade(r1.id, 95.0, RevisionStatus::Accepted).await;
    assert_eq!(grade.points_netto, 95.0);

    let after = fx
        .grading
        .get_queue_entry(artifact.id, student)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after, before);
    assert_eq!(after.last_revision_id, r2.id);
    assert_eq!(after.last_accepted_points_netto, None);
}

#[tokio::test]
async fn test_exemption_recomputes_penalty_and_netto() {
    let fx = Fixture::new().await;
    let student = fx.student("Ewa", "S1-001").await;
    let stage = fx
        .stage(
            "Report",
            100,
            Some(t0() + Duration::days(1)),
            Some(t0() + Duration::days(2)),
            10.0,
            50.0,
        )
        .await;
    let artifact = fx.artifact(stage.id, "report").await;

    fx.clock.set(t0() + Duration::days(2) + Duration::hours(5));
    let revision = fx.submit(student, artifact.id).await;
    fx.advance_hours(1);
    let grade = fx.grade(revision.id, 80.0, RevisionStatus::Accepted).await;
    assert_eq!(grade.points_netto, 0.0);

    let entry = fx
        .grading
        .get_queue_entry(artifact.id, student)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.penalty_percent_applied, 100.0);

    let exemption = fx
        .grading
        .upsert_exemption(
            TEACHER,
            UpsertExemptionRequest {
                stage_id: stage.id,
                student_id: student,
                allow_after_hard: true,
                custom_soft: None,
                custom_hard: None,
                reason: Some("medical leave".into()),
            },
        )
        .await
        .unwrap();
    assert!(exemption.allow_after_hard);

    let entry = fx
        .grading
        .get_queue_entry(artifact.id, student)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.late_days_started, 1);
    assert_eq!(entry.penalty_percent_applied, 10.0);
    assert_eq!(entry.last_points_brutto, Some(80.0));
    assert_eq!(entry.last_points_netto, Some(72.0));
    assert_eq!(entry.last_accepted_points_netto, Some(72.0));
    assert_eq!(entry.last_revision_status, RevisionStatus::Accepted);

    assert_eq!(fx.grading.aggregate_task(fx.task.id, student).await.unwrap().points, 72.0);
    assert_eq!(fx.audit.events_of(AuditEventType::ExemptionUpserted).len(), 1);

    // 重复写入覆盖同一条豁免
    let again = fx
        .grading
        .upsert_exemption(
            TEACHER,
            UpsertExemptionRequest {
                stage_id: stage.id,
                student_id: student,
                allow_after_hard: false,
                custom_soft: None,
                custom_hard: None,
                reason: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(again.id, exemption.id);
    let entry = fx
        .grading
        .get_queue_entry(artifact.id, student)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.penalty_percent_applied, 100.0);
    assert_eq!(entry.last_accepted_points_netto, Some(0.0));
}

#[tokio::test]
async fn test_stage_penalty_change_recomputes_rows() {
    let fx = Fixture::new().await;
    let student = fx.student("Ewa", "S1-001").await;
    let stage = fx
        .stage("Report", 100, Some(t0() + Duration::days(1)), None, 10.0, 50.0)
        .await;
    let artifact = fx.artifact(stage.id, "report").await;

    fx.clock.set(t0() + Duration::days(1) + Duration::hours(30));
    let revision = fx.submit(student, artifact.id).await;
    fx.advance_hours(1);
    fx.grade(revision.id, 50.0, RevisionStatus::Accepted).await;
    let entry = fx
        .grading
        .get_queue_entry(artifact.id, student)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.penalty_percent_applied, 20.0);
    assert_eq!(entry.last_points_netto, Some(40.0));

    fx.courses
        .update_stage(
            TEACHER,
            stage.id,
            UpdateStageRequest {
                penalty: Some(PenaltyPolicy {
                    k_percent_per_24h: 5.0,
                    max_m_percent: 50.0,
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let entry = fx
        .grading
        .get_queue_entry(artifact.id, student)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.penalty_percent_applied, 10.0);
    assert_eq!(entry.last_points_netto, Some(45.0));
    assert_eq!(entry.last_accepted_points_netto, Some(45.0));
    assert!(fx.audit.events_of(AuditEventType::StageDeadlinesChanged).is_empty());

    // 推迟软截止时间后提交变为准时
    let new_soft = fx.now() + Duration::hours(1);
    let updated = fx
        .courses
        .update_stage(
            TEACHER,
            stage.id,
            UpdateStageRequest {
                soft_deadline: Some(new_soft),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.soft_deadline, Some(new_soft));
    let entry = fx
        .grading
        .get_queue_entry(artifact.id, student)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.soft_deadline, Some(new_soft));
    assert_eq!(entry.late_days_started, 0);
    assert_eq!(entry.penalty_percent_applied, 0.0);
    assert_eq!(entry.last_points_netto, Some(50.0));
    assert_eq!(fx.audit.events_of(AuditEventType::StageDeadlinesChanged).len(), 1);
}

#[tokio::test]
async fn test_invalid_transition_is_rejected_without_side_effects() {
    let fx = Fixture::new().await;
    let student = fx.student("Ewa", "S1-001").await;
    let stage = fx.stage("Design", 100, None, None, 0.0, 0.0).await;
    let artifact = fx.artifact(stage.id, "design").await;

    let revision = fx.submit(student, artifact.id).await;
    fx.advance_hours(1);
    fx.grade(revision.id, 80.0, RevisionStatus::Accepted).await;
    let before = fx
        .grading
        .get_queue_entry(artifact.id, student)
        .await
        .unwrap();

    let err = fx
        .grading
        .grade_revision(TEACHER, grading(revision.id, 10.0, RevisionStatus::Rejected))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E008");

    let after = fx
        .grading
        .get_queue_entry(artifact.id, student)
        .await
        .unwrap();
    assert_eq!(before, after);
    let history = fx.grading.revision_history(artifact.id, student).await.unwrap();
    assert_eq!(history.items[0].grades.len(), 1);
    assert_eq!(history.items[0].revision.status, RevisionStatus::Accepted);

    // 重新打开：状态回到 NEEDS_FIX，上一次通过的分数保留
    fx.advance_hours(1);
    fx.grade(revision.id, 60.0, RevisionStatus::NeedsFix).await;
    let entry = fx
        .grading
        .get_queue_entry(artifact.id, student)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.last_revision_status, RevisionStatus::NeedsFix);
    assert_eq!(entry.last_points_netto, Some(60.0));
    assert_eq!(entry.last_accepted_points_netto, Some(80.0));

    let err = fx
        .grading
        .grade_revision(TEACHER, grading(revision.id, 85.0, RevisionStatus::Accepted))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E008");
}

#[tokio::test]
async fn test_missing_resources_are_not_found() {
    let fx = Fixture::new().await;
    let student = fx.student("Ewa", "S1-001").await;

    let err = fx
        .grading
        .submit_revision(student, submission(999, "report.pdf"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E007");

    let err = fx
        .grading
        .grade_revision(TEACHER, grading(999, 50.0, RevisionStatus::Accepted))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E007");

    assert_eq!(fx.grading.aggregate_task(999, student).await.unwrap_err().code(), "E007");
    assert_eq!(
        fx.grading.revision_history(999, student).await.unwrap_err().code(),
        "E007"
    );
    assert!(fx.grading.get_queue_entry(999, student).await.unwrap().is_none());
}

#[tokio::test]
async fn test_submission_validation() {
    let fx = Fixture::new().await;
    let student = fx.student("Ewa", "S1-001").await;
    let stage = fx.stage("Report", 100, None, None, 0.0, 0.0).await;
    let artifact = fx
        .courses
        .create_artifact(
            TEACHER,
            rust_coursework_grading::models::courses::requests::CreateArtifactRequest {
                stage_id: stage.id,
                name: "report".into(),
                max_size_bytes: Some(1024),
                allowed_extensions: vec![".PDF".into()],
            },
        )
        .await
        .unwrap();
    assert_eq!(artifact.allowed_extensions, vec!["pdf".to_string()]);

    let err = fx
        .grading
        .submit_revision(student, submission(artifact.id, "report.docx"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E006");

    // 超过大小限制
    let err = fx
        .grading
        .submit_revision(student, submission(artifact.id, "report.pdf"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E006");

    let mut request = submission(artifact.id, "report.pdf");
    request.size_bytes = Some(512);
    fx.grading.submit_revision(student, request).await.unwrap();

    // 未选课的学生
    let outsider = fx
        .courses
        .create_user(rust_coursework_grading::models::users::requests::CreateUserRequest {
            first_name: "Piotr".into(),
            last_name: "Zielinski".into(),
            email: "piotr@example.edu".into(),
        })
        .await
        .unwrap();
    let mut request = submission(artifact.id, "report.pdf");
    request.size_bytes = Some(10);
    let err = fx
        .grading
        .submit_revision(outsider.id, request)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E006");

    let err = fx
        .grading
        .grade_revision(TEACHER, grading(1, f64::NAN, RevisionStatus::Accepted))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E006");
}

#[tokio::test]
async fn test_failing_audit_sink_does_not_fail_operations() {
    let fx = Fixture::with_audit(RecordingAuditSink::failing()).await;
    let student = fx.student("Ewa", "S1-001").await;
    let stage = fx.stage("Design", 100, None, None, 0.0, 0.0).await;
    let artifact = fx.artifact(stage.id, "design").await;

    let revision = fx.submit(student, artifact.id).await;
    fx.advance_hours(1);
    let grade = fx.grade(revision.id, 75.0, RevisionStatus::Accepted).await;
    assert_eq!(grade.points_netto, 75.0);
    assert!(fx.audit.events().is_empty());
    assert_eq!(fx.grading.aggregate_task(fx.task.id, student).await.unwrap().points, 75.0);
}

#[tokio::test]
async fn test_audit_events_are_recorded() {
    let fx = Fixture::new().await;
    let student = fx.student("Ewa", "S1-001").await;
    let stage = fx.stage("Design", 100, None, None, 0.0, 0.0).await;
    let artifact = fx.artifact(stage.id, "design").await;
    let revision = fx.submit(student, artifact.id).await;
    fx.advance_hours(1);
    fx.grade(revision.id, 75.0, RevisionStatus::Accepted).await;

    assert_eq!(fx.audit.events_of(AuditEventType::TaskCreated).len(), 1);
    assert_eq!(fx.audit.events_of(AuditEventType::StageCreated).len(), 1);
    assert_eq!(fx.audit.events_of(AuditEventType::ArtifactCreated).len(), 1);

    let submitted = fx.audit.events_of(AuditEventType::RevisionSubmitted);
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].actor_id, Some(student));
    assert_eq!(submitted[0].context["revision_id"], revision.id);

    let graded = fx.audit.events_of(AuditEventType::RevisionGraded);
    assert_eq!(graded.len(), 1);
    assert_eq!(graded[0].actor_id, Some(TEACHER));
}

#[tokio::test]
async fn test_revision_history_newest_first() {
    let fx = Fixture::new().await;
    let student = fx.student("Ewa", "S1-001").await;
    let stage = fx.stage("Design", 100, None, None, 0.0, 0.0).await;
    let artifact = fx.artifact(stage.id, "design").await;

    let r1 = fx.submit(student, artifact.id).await;
    fx.advance_hours(1);
    fx.grade(r1.id, 40.0, RevisionStatus::NeedsFix).await;
    fx.advance_hours(1);
    fx.grade(r1.id, 45.0, RevisionStatus::NeedsFix).await;
    fx.advance_hours(1);
    let r2 = fx.submit(student, artifact.id).await;

    let history = fx.grading.revision_history(artifact.id, student).await.unwrap();
    assert_eq!(history.items.len(), 2);
    assert_eq!(history.items[0].revision.id, r2.id);
    assert!(history.items[0].grades.is_empty());
    assert_eq!(history.items[1].revision.id, r1.id);
    let points: Vec<f64> = history.items[1].grades.iter().map(|g| g.points_brutto).collect();
    assert_eq!(points, vec![40.0, 45.0]);
}

#[tokio::test]
async fn test_rebuild_all_reports_and_audits() {
    let fx = Fixture::new().await;
    let ewa = fx.student("Ewa", "S1-001").await;
    let jan = fx.student("Jan", "S1-002").await;
    let stage = fx.stage("Design", 100, None, None, 0.0, 0.0).await;
    let design = fx.artifact(stage.id, "design").await;
    let diagram = fx.artifact(stage.id, "diagram").await;

    let r1 = fx.submit(ewa, design.id).await;
    fx.submit(ewa, diagram.id).await;
    fx.submit(jan, design.id).await;
    fx.advance_hours(1);
    fx.grade(r1.id, 90.0, RevisionStatus::Accepted).await;

    let report = fx.grading.rebuild_all().await.unwrap();
    assert_eq!(report.rebuilt, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(fx.audit.events_of(AuditEventType::QueueRebuilt).len(), 1);

    let entry = fx.grading.get_queue_entry(design.id, ewa).await.unwrap().unwrap();
    assert_eq!(entry.last_accepted_points_netto, Some(90.0));
    assert!(fx.grading.rebuild_queue_entry(design.id, 999).await.unwrap().is_none());
}
