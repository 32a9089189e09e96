use sqlx::PgPool;
use storybook_core::wizard::{PhotoSlot, WizardData};
use storybook_db::repositories::WizardSessionRepo;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_session_starts_at_step_one(pool: PgPool) {
    let session = WizardSessionRepo::create(&pool, None).await.unwrap();
    assert_eq!(session.current_step, 1);
    assert_eq!(session.status, "in_progress");
    assert_eq!(session.data.0, WizardData::default());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_saved_data_never_contains_previews(pool: PgPool) {
    let session = WizardSessionRepo::create(&pool, None).await.unwrap();
    let data = WizardData {
        theme: Some("Adventure".into()),
        child_photo: PhotoSlot {
            path: Some("children/x/y.png".into()),
            preview: Some("data:image/png;base64,AAAA".into()),
            uploading: false,
        },
        ..Default::default()
    };

    let (_, returned) = WizardSessionRepo::update_data(&pool, session.id, |stored| {
        *stored = data.clone();
        Ok::<(), sqlx::Error>(())
    })
    .await
    .unwrap()
    .unwrap();
    // The caller still gets the preview back.
    assert!(returned.child_photo.preview.is_some());

    let raw: (serde_json::Value,) = sqlx::query_as("SELECT data FROM wizard_sessions WHERE id = $1")
        .bind(session.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(raw.0["child_photo"].get("preview").is_none());
    assert_eq!(raw.0["child_photo"]["path"], "children/x/y.png");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_step_outside_range_is_rejected_by_schema(pool: PgPool) {
    let session = WizardSessionRepo::create(&pool, None).await.unwrap();
    assert!(WizardSessionRepo::update_step(&pool, session.id, 9).await.is_err());

    let moved = WizardSessionRepo::update_step(&pool, session.id, 2)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.current_step, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_clears_data(pool: PgPool) {
    let session = WizardSessionRepo::create(&pool, None).await.unwrap();
    let data = WizardData {
        child_name: Some("Mia".into()),
        ..Default::default()
    };
    WizardSessionRepo::update_data(&pool, session.id, |stored| {
        *stored = data;
        Ok::<(), sqlx::Error>(())
    })
    .await
    .unwrap();

    let submitted = WizardSessionRepo::mark_submitted(&pool, session.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(submitted.status, "submitted");
    assert_eq!(submitted.data.0, WizardData::default());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_updates_are_all_kept(pool: PgPool) {
    let session = WizardSessionRepo::create(&pool, None).await.unwrap();

    let set_theme = WizardSessionRepo::update_data(&pool, session.id, |data| {
        data.theme = Some("Adventure".into());
        Ok::<(), sqlx::Error>(())
    });
    let set_path = WizardSessionRepo::update_data(&pool, session.id, |data| {
        data.child_photo.path = Some("children/x/y.png".into());
        Ok::<(), sqlx::Error>(())
    });
    let (a, b) = tokio::join!(set_theme, set_path);
    a.unwrap().unwrap();
    b.unwrap().unwrap();

    let stored = WizardSessionRepo::find_by_id(&pool, session.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.data.0.theme.as_deref(), Some("Adventure"));
    assert_eq!(stored.data.0.child_photo.path.as_deref(), Some("children/x/y.png"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_update_changes_nothing(pool: PgPool) {
    let session = WizardSessionRepo::create(&pool, None).await.unwrap();

    let result = WizardSessionRepo::update_data(&pool, session.id, |data| {
        data.theme = Some("Space".into());
        Err(sqlx::Error::RowNotFound)
    })
    .await;
    assert!(result.is_err());

    let stored = WizardSessionRepo::find_by_id(&pool, session.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.data.0.theme.is_none());

    let missing = WizardSessionRepo::update_data(&pool, uuid::Uuid::new_v4(), |_| {
        Ok::<(), sqlx::Error>(())
    })
    .await
    .unwrap();
    assert!(missing.is_none());
}
