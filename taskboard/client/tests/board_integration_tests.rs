use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database};
use taskboard_client::{
    DeleteOutcome, HttpTaskApi, NewTask, TaskApi, TaskBoard, TaskPatch, TaskStatus,
};

/// Starts the real server on an ephemeral port with an in-memory store.
async fn spawn_server() -> anyhow::Result<String> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    let app = taskboard_server::web::create_app(db);
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    Ok(format!("http://{address}"))
}

fn confirm_yes(_: &str) -> bool {
    true
}

#[tokio::test]
async fn can_keep_cache_in_step_with_server() {
    let base_url = spawn_server().await.expect("Failed to start server");
    let mut board = TaskBoard::new(HttpTaskApi::new(base_url.clone()));

    assert!(board.cache().is_loading());
    assert!(board.load().await.unwrap().is_empty());

    let first = board
        .create(NewTask {
            name: "one".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let second = board
        .create(NewTask {
            name: "two".to_string(),
            text: Some("2%".to_string()),
            status: None,
        })
        .await
        .unwrap();
    let third = board
        .create(NewTask {
            name: "three".to_string(),
            text: None,
            status: Some(TaskStatus::Progress),
        })
        .await
        .unwrap();

    assert_eq!(second.status, TaskStatus::Pending);
    assert_eq!(
        board.cache().tasks(),
        Some(&[third.clone(), second.clone(), first.clone()][..])
    );

    let outcome = board.delete(second.id, &confirm_yes).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(
        board.cache().tasks(),
        Some(&[third.clone(), first.clone()][..])
    );

    let server_view = HttpTaskApi::new(base_url).list().await.unwrap();
    assert_eq!(server_view.len(), 2);
    assert!(server_view.contains(&first));
    assert!(server_view.contains(&third));
}

#[tokio::test]
async fn surfaces_server_errors_without_touching_cache() {
    let base_url = spawn_server().await.expect("Failed to start server");
    let mut board = TaskBoard::new(HttpTaskApi::new(base_url));
    board.load().await.unwrap();
    let task = board
        .create(NewTask {
            name: "Buy milk".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let before = board.cache().tasks().unwrap().to_vec();

    let invalid = board
        .create(NewTask {
            name: "   ".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(invalid.to_string().contains("VALIDATION_ERROR"));

    let missing = board
        .update(
            uuid::Uuid::new_v4(),
            TaskPatch {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(missing.is_not_found());

    board.delete(task.id, &confirm_yes).await.unwrap();
    let gone = board.delete(task.id, &confirm_yes).await.unwrap_err();
    assert!(gone.is_not_found());

    assert_eq!(before.len(), 1);
    assert_eq!(board.cache().tasks(), Some(&[][..]));
}

#[tokio::test]
async fn can_update_task_through_the_board() {
    let base_url = spawn_server().await.expect("Failed to start server");
    let mut board = TaskBoard::new(HttpTaskApi::new(base_url));
    board.load().await.unwrap();
    let created = board
        .create(NewTask {
            name: "Buy milk".to_string(),
            text: Some("2%".to_string()),
            status: None,
        })
        .await
        .unwrap();

    let updated = board
        .update(
            created.id,
            TaskPatch {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, TaskStatus::Done);
    assert_eq!(updated.name, "Buy milk");
    assert_eq!(updated.text.as_deref(), Some("2%"));
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(board.cache().tasks(), Some(&[updated][..]));
}

#[tokio::test]
async fn reports_unreachable_server_as_transport_error() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let mut board = TaskBoard::new(HttpTaskApi::new(format!("http://{address}")));
    let err = board.load().await.unwrap_err();

    assert!(matches!(err, taskboard_client::ClientError::Transport(_)));
    assert!(board.cache().is_loading());
}
