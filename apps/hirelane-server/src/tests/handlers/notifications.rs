//! Notification and admin analytics tests.

use axum::extract::{Json, Path, Query, State};
use futures::StreamExt;

use hirelane_events::{EventBus, NotificationKind};
use hirelane_storage::JobReportId;

use crate::error::ApiError;
use crate::handlers::admin::*;
use crate::handlers::companies::{report_job, ReportJobRequest};
use crate::handlers::notifications::*;
use crate::tests::common::*;

#[tokio::test]
async fn contact_form_publishes_live_counter() {
    let state = create_test_state().await;
    let mut events = state.events.subscribe().await.unwrap();

    submit_contact(
        State(state.clone()),
        Json(ContactRequest {
            name: "Visitor".into(),
            email: "visitor@example.com".into(),
            subject: "Plans".into(),
            message: "Do you have yearly pricing?".into(),
        }),
    )
    .await
    .unwrap();

    let event = events.next().await.unwrap();
    assert_eq!(event.kind, NotificationKind::ContactMessage);
    assert_eq!(event.unseen, 1);
}

#[tokio::test]
async fn report_feed_tracks_seen_state() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let student = create_student(&state, "s@example.com").await;
    let admin = create_admin(&state, "root@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    let job_id = post_test_job(&state, &owner, &company_id).await;

    report_job(
        State(state.clone()),
        student,
        Json(ReportJobRequest {
            job_id: job_id.0,
            reason: "Spam posting".into(),
        }),
    )
    .await
    .unwrap();

    let counts = unseen_counts(State(state.clone()), admin.clone())
        .await
        .unwrap();
    assert_eq!(counts.0["reports"], 1);
    assert_eq!(counts.0["contacts"], 0);

    let listed = list_reports(
        State(state.clone()),
        admin.clone(),
        Query(FeedQuery { unseen: true }),
    )
    .await
    .unwrap();
    let reports = listed.0["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    let report_id = uuid::Uuid::parse_str(reports[0]["id"].as_str().unwrap()).unwrap();

    mark_report_seen(State(state.clone()), admin.clone(), Path(report_id))
        .await
        .unwrap();
    let counts = unseen_counts(State(state.clone()), admin).await.unwrap();
    assert_eq!(counts.0["reports"], 0);
}

#[tokio::test]
async fn admin_endpoints_reject_non_admins() {
    let state = create_test_state().await;
    let student = create_student(&state, "s@example.com").await;

    assert!(matches!(
        unseen_counts(State(state.clone()), student.clone())
            .await
            .unwrap_err(),
        ApiError::Forbidden(_)
    ));
    assert!(matches!(
        list_reports(
            State(state.clone()),
            student.clone(),
            Query(FeedQuery::default())
        )
        .await
        .unwrap_err(),
        ApiError::Forbidden(_)
    ));
    assert!(matches!(
        mark_report_seen(
            State(state.clone()),
            student.clone(),
            Path(uuid::Uuid::new_v4())
        )
        .await
        .unwrap_err(),
        ApiError::Forbidden(_)
    ));
    assert!(matches!(
        stats_counts(State(state.clone()), student).await.unwrap_err(),
        ApiError::Forbidden(_)
    ));
}

#[tokio::test]
async fn missing_report_is_404_for_admins() {
    let state = create_test_state().await;
    let admin = create_admin(&state, "root@example.com").await;

    let ghost = JobReportId(uuid::Uuid::new_v4());
    let err = mark_report_seen(State(state.clone()), admin, Path(ghost.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn stats_counts_reflect_activity() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let _student = create_student(&state, "s@example.com").await;
    let admin = create_admin(&state, "root@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    post_test_job(&state, &owner, &company_id).await;

    let counts = stats_counts(State(state.clone()), admin).await.unwrap();
    assert_eq!(counts.0["counts"]["students"], 1);
    assert_eq!(counts.0["counts"]["recruiters"], 1);
    assert_eq!(counts.0["counts"]["admins"], 1);
    assert_eq!(counts.0["counts"]["companies"], 1);
    assert_eq!(counts.0["counts"]["jobs"], 1);
}

#[tokio::test]
async fn trend_validates_inputs() {
    let state = create_test_state().await;
    let admin = create_admin(&state, "root@example.com").await;
    let today = chrono::Utc::now().date_naive();

    let err = stats_trend(
        State(state.clone()),
        admin.clone(),
        Query(TrendQuery {
            entity: "satellites".into(),
            from: today,
            to: today,
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let err = stats_trend(
        State(state.clone()),
        admin.clone(),
        Query(TrendQuery {
            entity: "students".into(),
            from: today,
            to: today - chrono::Duration::days(1),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let trend = stats_trend(
        State(state.clone()),
        admin,
        Query(TrendQuery {
            entity: "students".into(),
            from: today - chrono::Duration::days(7),
            to: today,
        }),
    )
    .await
    .unwrap();
    assert!(trend.0["trend"].as_array().is_some());
}

#[tokio::test]
async fn recent_activity_feed_shows_latest_first() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let admin = create_admin(&state, "root@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    post_test_job(&state, &owner, &company_id).await;

    let feed = recent_activity(
        State(state.clone()),
        admin,
        Query(RecentActivityQuery { limit: Some(10) }),
    )
    .await
    .unwrap();
    let activity = feed.0["activity"].as_array().unwrap();
    assert!(!activity.is_empty());
    assert_eq!(activity[0]["action"], "job.post");
}
