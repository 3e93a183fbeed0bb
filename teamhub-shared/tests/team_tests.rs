/// Integration tests for teams, membership and file registration
///
/// Require a running PostgreSQL at `DATABASE_URL`.

mod common;

use teamhub_shared::error::ServiceError;
use teamhub_shared::models::team_member::TeamMemberRole;
use teamhub_shared::models::user::UserRole;
use teamhub_shared::services::files::{list_files, register_file, NewFile};
use teamhub_shared::auth::middleware::AuthContext;
use teamhub_shared::services::tasks::{create_task, get_task, NewTask};
use teamhub_shared::services::teams::{
    add_member, create_team, delete_team, get_team, remove_member,
};
use uuid::Uuid;

#[tokio::test]
async fn test_creator_joins_as_lead() {
    let pool = common::setup_pool().await;
    let actor = common::create_user(&pool, UserRole::Coordinator).await;

    let team = create_team(&pool, &actor, Some("Outreach".to_string()), None)
        .await
        .unwrap();

    assert_eq!(team.team.name, "Outreach");
    assert_eq!(team.member_count, 1);
    assert_eq!(team.members.0.len(), 1);
    assert_eq!(team.members.0[0].user_id, actor.user_id);
    assert_eq!(team.members.0[0].role, TeamMemberRole::Lead);
}

#[tokio::test]
async fn test_add_member_by_email() {
    let pool = common::setup_pool().await;
    let actor = common::create_user(&pool, UserRole::Coordinator).await;
    let volunteer = common::create_named_user(&pool, UserRole::Contributor, "Sam Volunteer").await;
    let team = create_team(&pool, &actor, Some("Events".to_string()), None)
        .await
        .unwrap();
    let team_id = team.team.id;

    // Email lookup ignores case and surrounding whitespace
    let member = add_member(
        &pool,
        &actor,
        team_id,
        Some(format!("  {}  ", volunteer.email.to_uppercase())),
        None,
    )
    .await
    .unwrap();
    assert_eq!(member.user_id, volunteer.id);
    assert_eq!(member.role, TeamMemberRole::Member);
    assert_eq!(member.user.name, "Sam Volunteer");

    let err = add_member(&pool, &actor, team_id, Some(volunteer.email.clone()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(err.to_string(), "User is already a member of this team");

    let err = add_member(
        &pool,
        &actor,
        team_id,
        Some("nobody@example.org".to_string()),
        Some(TeamMemberRole::Lead),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = add_member(&pool, &actor, Uuid::new_v4(), Some(volunteer.email), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = add_member(&pool, &actor, team_id, None, None).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation { field: "email", .. }));

    let detail = get_team(&pool, &actor, team_id).await.unwrap();
    assert_eq!(detail.summary.member_count, 2);
}

#[tokio::test]
async fn test_remove_member_is_idempotent() {
    let pool = common::setup_pool().await;
    let actor = common::create_user(&pool, UserRole::Coordinator).await;
    let volunteer = common::create_named_user(&pool, UserRole::Contributor, "Pat").await;
    let team = create_team(&pool, &actor, Some("Research".to_string()), None)
        .await
        .unwrap();
    let team_id = team.team.id;

    add_member(&pool, &actor, team_id, Some(volunteer.email.clone()), None)
        .await
        .unwrap();

    remove_member(&pool, &actor, team_id, volunteer.id).await.unwrap();
    remove_member(&pool, &actor, team_id, volunteer.id).await.unwrap();

    let removals: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM activities WHERE team_id = $1 AND type = 'MEMBER_REMOVED'",
    )
    .bind(team_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(removals, 1);

    let detail = get_team(&pool, &actor, team_id).await.unwrap();
    assert_eq!(detail.summary.member_count, 1);
}

#[tokio::test]
async fn test_delete_team_keeps_tasks() {
    let pool = common::setup_pool().await;
    let creator = common::create_user(&pool, UserRole::Coordinator).await;
    let other = common::create_user(&pool, UserRole::Coordinator).await;
    let team = create_team(&pool, &creator, Some("Programs".to_string()), None)
        .await
        .unwrap();
    let team_id = team.team.id;

    let task = create_task(
        &pool,
        &creator,
        NewTask {
            title: Some("Team task".to_string()),
            team_id: Some(team_id),
            ..NewTask::default()
        },
    )
    .await
    .unwrap();

    let detail = get_team(&pool, &creator, team_id).await.unwrap();
    assert_eq!(detail.tasks.len(), 1);
    assert_eq!(detail.summary.task_count, 1);

    let err = delete_team(&pool, &other, team_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    delete_team(&pool, &creator, team_id).await.unwrap();

    let err = get_team(&pool, &creator, team_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let remaining: Option<Uuid> = sqlx::query_scalar("SELECT team_id FROM tasks WHERE id = $1")
        .bind(task.task.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(remaining.is_none());
}

#[tokio::test]
async fn test_team_detail_hides_unassigned_tasks_from_contributor() {
    let pool = common::setup_pool().await;
    let lead = common::create_user(&pool, UserRole::Coordinator).await;
    let volunteer = common::create_named_user(&pool, UserRole::Contributor, "Robin").await;
    let volunteer_ctx = AuthContext::new(volunteer.id, volunteer.role);
    let team = create_team(&pool, &lead, Some("Logistics".to_string()), None)
        .await
        .unwrap();
    let team_id = team.team.id;

    add_member(&pool, &lead, team_id, Some(volunteer.email.clone()), None)
        .await
        .unwrap();

    let hidden = create_task(
        &pool,
        &lead,
        NewTask {
            title: Some("Book venue".to_string()),
            team_id: Some(team_id),
            ..NewTask::default()
        },
    )
    .await
    .unwrap();
    let assigned = create_task(
        &pool,
        &lead,
        NewTask {
            title: Some("Print flyers".to_string()),
            team_id: Some(team_id),
            assignee_id: Some(volunteer.id),
            ..NewTask::default()
        },
    )
    .await
    .unwrap();

    let err = get_task(&pool, &volunteer_ctx, hidden.task.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let detail = get_team(&pool, &volunteer_ctx, team_id).await.unwrap();
    let ids: Vec<Uuid> = detail.tasks.iter().map(|t| t.task.id).collect();
    assert_eq!(ids, vec![assigned.task.id]);

    let detail = get_team(&pool, &lead, team_id).await.unwrap();
    assert_eq!(detail.tasks.len(), 2);
}

#[tokio::test]
async fn test_register_file() {
    let pool = common::setup_pool().await;
    let actor = common::create_user(&pool, UserRole::Contributor).await;
    let task = create_task(
        &pool,
        &actor,
        NewTask {
            title: Some("Collect receipts".to_string()),
            ..NewTask::default()
        },
    )
    .await
    .unwrap();

    let file = register_file(
        &pool,
        &actor,
        NewFile {
            filename: Some("receipt.pdf".to_string()),
            storage_key: Some(format!("uploads/{}", Uuid::new_v4())),
            mime_type: Some("application/pdf".to_string()),
            size_bytes: Some(2048),
            task_id: Some(task.task.id),
        },
    )
    .await
    .unwrap();
    assert_eq!(file.file.task_id, Some(task.task.id));
    assert_eq!(file.uploader.id, actor.user_id);

    let files = list_files(&pool, Some(task.task.id)).await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(
        common::count_task_activities(&pool, task.task.id, "FILE_UPLOADED").await,
        1
    );

    let library = register_file(
        &pool,
        &actor,
        NewFile {
            filename: Some("handbook.txt".to_string()),
            storage_key: Some(format!("uploads/{}", Uuid::new_v4())),
            mime_type: None,
            size_bytes: Some(10),
            task_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(library.file.mime_type, "application/octet-stream");

    let err = register_file(
        &pool,
        &actor,
        NewFile {
            filename: Some("huge.bin".to_string()),
            storage_key: Some("uploads/huge".to_string()),
            size_bytes: Some(11 * 1024 * 1024),
            ..NewFile::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { field: "sizeBytes", .. }));

    let err = register_file(
        &pool,
        &actor,
        NewFile {
            filename: Some("lost.txt".to_string()),
            storage_key: Some("uploads/lost".to_string()),
            size_bytes: Some(1),
            task_id: Some(Uuid::new_v4()),
            ..NewFile::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}
