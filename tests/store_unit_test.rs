use minaret::config::AdminSeed;
use minaret::error::MinaretError;
use minaret::store::{self, EventStatus, NewEvent, NewPrayerTime, SettingUpsert};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

fn test_admin() -> AdminSeed {
    AdminSeed {
        email: "admin@test.uz".to_string(),
        password: "Test@123".to_string(),
        name: "Test Admin".to_string(),
    }
}

// One connection so every query sees the same in-memory database.
async fn seeded_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    store::init_schema(&pool).await.expect("Schema creation failed");
    store::seed_defaults(&pool, &test_admin())
        .await
        .expect("Seeding failed");
    pool
}

fn sample_event() -> NewEvent {
    NewEvent {
        title: "Quran darsi".to_string(),
        date: "2025-03-01".to_string(),
        time: "17:00".to_string(),
        description: "Haftalik Quran darsi".to_string(),
        detailed_description: Some("Barcha yoshlar uchun ochiq".to_string()),
        image: None,
        status: EventStatus::Active,
    }
}

#[tokio::test]
async fn test_seeding_fills_empty_tables() {
    let pool = seeded_pool().await;

    let times = store::list_prayer_times(&pool).await.unwrap();
    assert_eq!(times.len(), 5);
    assert_eq!(times[0].name, "Bomdod");
    assert_eq!(times[4].time, "19:45");

    let settings = store::grouped_settings(&pool).await.unwrap();
    assert!(settings.contains_key("donation"));
    assert!(settings.contains_key("mosque_info"));
    assert_eq!(
        settings["contact"]["contact_friday_prayer"],
        "12:30".to_string()
    );

    let events = store::list_active_events(&pool).await.unwrap();
    assert_eq!(events.len(), 2);

    let admin = store::find_admin(&pool, "admin@test.uz").await.unwrap();
    let admin = admin.expect("Seed admin should exist");
    assert_eq!(admin.role, "admin");
    // Stored as an Argon2id hash, never plaintext
    assert!(admin.password.starts_with("$argon2"));
    assert_ne!(admin.password, "Test@123");
}

#[tokio::test]
async fn test_seeding_is_idempotent() {
    let pool = seeded_pool().await;
    store::seed_defaults(&pool, &test_admin()).await.unwrap();

    assert_eq!(store::list_prayer_times(&pool).await.unwrap().len(), 5);
    assert_eq!(store::list_active_events(&pool).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_replace_prayer_times_returns_canonical_rows() {
    let pool = seeded_pool().await;

    let replacement: Vec<NewPrayerTime> = [
        ("Bomdod", "05:45"),
        ("Peshin", "12:30"),
        ("Asr", "16:00"),
        ("Shom", "18:35"),
        ("Hufton", "20:00"),
    ]
    .iter()
    .map(|(name, time)| NewPrayerTime {
        name: (*name).to_string(),
        time: (*time).to_string(),
        arabic: "ـ".to_string(),
    })
    .collect();

    let stored = store::replace_prayer_times(&pool, &replacement).await.unwrap();
    assert_eq!(stored.len(), 5);
    assert_eq!(stored[0].time, "05:45");
    assert_eq!(stored[4].time, "20:00");

    // A re-read agrees with what the replace returned
    assert_eq!(store::list_prayer_times(&pool).await.unwrap(), stored);
}

#[tokio::test]
async fn test_event_lifecycle() {
    let pool = seeded_pool().await;

    let created = store::create_event(&pool, &sample_event()).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.status, EventStatus::Active);

    let listed = store::list_active_events(&pool).await.unwrap();
    assert!(listed.iter().any(|e| e.id == created.id));

    // Cancelling removes it from the public listing but keeps the record
    let mut cancelled = sample_event();
    cancelled.status = EventStatus::Cancelled;
    let updated = store::update_event(&pool, created.id, &cancelled).await.unwrap();
    assert_eq!(updated.status, EventStatus::Cancelled);

    let listed = store::list_active_events(&pool).await.unwrap();
    assert!(!listed.iter().any(|e| e.id == created.id));

    let fetched = store::get_event(&pool, created.id).await.unwrap();
    assert_eq!(fetched.status, EventStatus::Cancelled);

    store::delete_event(&pool, created.id).await.unwrap();
    let err = store::get_event(&pool, created.id).await.unwrap_err();
    assert!(matches!(err, MinaretError::NotFound(_)));
}

#[tokio::test]
async fn test_event_update_unknown_id_is_not_found() {
    let pool = seeded_pool().await;

    let err = store::update_event(&pool, 9999, &sample_event()).await.unwrap_err();
    assert!(matches!(err, MinaretError::NotFound(_)));

    let err = store::delete_event(&pool, 9999).await.unwrap_err();
    assert!(matches!(err, MinaretError::NotFound(_)));
}

#[tokio::test]
async fn test_settings_upsert_is_idempotent() {
    let pool = seeded_pool().await;

    let entry = |value: &str| SettingUpsert {
        key: "donation_title".to_string(),
        value: value.to_string(),
        category: "donation".to_string(),
    };

    store::upsert_settings(&pool, &[entry("Birinchi")]).await.unwrap();
    store::upsert_settings(&pool, &[entry("Ikkinchi")]).await.unwrap();

    // One row per key, final value equals the last write
    let setting = store::get_setting(&pool, "donation_title").await.unwrap();
    assert_eq!(setting.value, "Ikkinchi");

    let grouped = store::grouped_settings(&pool).await.unwrap();
    assert_eq!(grouped["donation"]["donation_title"], "Ikkinchi".to_string());

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM settings WHERE key = 'donation_title'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_settings_upsert_inserts_new_keys() {
    let pool = seeded_pool().await;

    let entry = SettingUpsert {
        key: "mosque_parking_info".to_string(),
        value: "Masjid orqasida".to_string(),
        category: "mosque_info".to_string(),
    };
    store::upsert_settings(&pool, &[entry]).await.unwrap();

    let setting = store::get_setting(&pool, "mosque_parking_info").await.unwrap();
    assert_eq!(setting.category, "mosque_info");
}

#[tokio::test]
async fn test_get_setting_unknown_key_is_not_found() {
    let pool = seeded_pool().await;
    let err = store::get_setting(&pool, "no_such_key").await.unwrap_err();
    assert!(matches!(err, MinaretError::NotFound(_)));
}

#[tokio::test]
async fn test_update_admin_profile_requires_a_change() {
    let pool = seeded_pool().await;
    let admin = store::find_admin(&pool, "admin@test.uz").await.unwrap().unwrap();

    let err = store::update_admin_profile(&pool, admin.id, None, None).await.unwrap_err();
    assert!(matches!(err, MinaretError::Validation(_)));
}

#[tokio::test]
async fn test_update_admin_profile_duplicate_email_is_a_conflict() {
    let pool = seeded_pool().await;
    let admin = store::find_admin(&pool, "admin@test.uz").await.unwrap().unwrap();

    sqlx::query("INSERT INTO admin_users (email, password, name, role) VALUES (?, ?, ?, ?)")
        .bind("second@test.uz")
        .bind("irrelevant-hash")
        .bind("Second Admin")
        .bind("admin")
        .execute(&pool)
        .await
        .unwrap();

    let err = store::update_admin_profile(&pool, admin.id, Some("second@test.uz"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MinaretError::Conflict(_)));
}

#[tokio::test]
async fn test_update_admin_profile_changes_email() {
    let pool = seeded_pool().await;
    let admin = store::find_admin(&pool, "admin@test.uz").await.unwrap().unwrap();

    store::update_admin_profile(&pool, admin.id, Some("yangi@test.uz"), None)
        .await
        .unwrap();

    assert!(store::find_admin(&pool, "admin@test.uz").await.unwrap().is_none());
    assert!(store::find_admin(&pool, "yangi@test.uz").await.unwrap().is_some());
}
