//! SQLite access layer for the Minaret site.
//!
//! Owns the connection pool, schema creation and first-boot seeding, plus the
//! CRUD operations for all four tables. Handlers never touch SQL directly.

use crate::auth;
use crate::config::AdminSeed;
use crate::error::{MinaretError, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Settings grouped by category for delivery to clients.
pub type SettingsMap = BTreeMap<String, BTreeMap<String, String>>;

/// One of the five fixed daily prayer entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PrayerTime {
    pub id: i64,
    pub name: String,
    pub time: String,
    pub arabic: String,
}

/// Replacement entry for the bulk prayer-time update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPrayerTime {
    pub name: String,
    pub time: String,
    pub arabic: String,
}

/// Lifecycle status of an event. Only `active` events are listed publicly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Active,
    Draft,
    Cancelled,
}

/// A community event as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub date: String,
    pub time: String,
    pub description: String,
    pub detailed_description: Option<String>,
    pub image: Option<String>,
    pub status: EventStatus,
}

/// Fields accepted when creating or updating an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub date: String,
    pub time: String,
    pub description: String,
    pub detailed_description: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub status: EventStatus,
}

/// A single key/value configuration row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Setting {
    pub id: i64,
    pub key: String,
    pub value: String,
    pub category: String,
}

/// Flat entry fed to the settings upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingUpsert {
    pub key: String,
    pub value: String,
    pub category: String,
}

/// Admin account row. The password field holds an Argon2id PHC string and is
/// never serialized to clients.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminUser {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
}

const DEFAULT_PRAYER_TIMES: [(&str, &str, &str); 5] = [
    ("Bomdod", "05:30", "فجر"),
    ("Peshin", "12:15", "ظهر"),
    ("Asr", "15:45", "عصر"),
    ("Shom", "18:20", "مغرب"),
    ("Hufton", "19:45", "عشاء"),
];

const DEFAULT_SETTINGS: [(&str, &str, &str); 23] = [
    // Mosque information
    ("mosque_name", "Chimir ota Jome Masjidi", "mosque_info"),
    (
        "mosque_address",
        "Toshkent Shahri Shayhontohur tumani\nYangi toshmi Chimir ota masjidi\nToshkent, O'zbekiston",
        "mosque_info",
    ),
    ("mosque_phone", "+998 12 345 6789", "mosque_info"),
    ("mosque_email", "info@chimirotajome.uz", "mosque_info"),
    ("mosque_website", "https://chimirotajome.uz", "mosque_info"),
    (
        "mosque_description",
        "Jamiyatimizga xizmat qiluvchi ibodat, bilim va birlik maskani.",
        "mosque_info",
    ),
    // Social media
    ("social_facebook", "https://facebook.com/chimirotajome", "social_media"),
    ("social_instagram", "https://instagram.com/chimirotajome", "social_media"),
    ("social_telegram", "https://t.me/chimirotajome", "social_media"),
    // Footer
    (
        "footer_copyright",
        "© 2025 Chimir ota Jome Masjidi. Barcha huquqlar himoyalangan.",
        "footer",
    ),
    ("footer_additional_text", "Ibodat va birlik maskani", "footer"),
    // Contact
    ("contact_office_hours", "9:00 dan 18:00 gacha", "contact"),
    ("contact_friday_prayer", "12:30", "contact"),
    // Donation
    ("donation_title", "𝐌𝐚𝐬𝐣𝐢𝐝 𝐮𝐜𝐡𝐮𝐧 𝐞𝐡𝐬𝐨𝐧", "donation"),
    (
        "donation_description",
        "Allah yo'lida ehson qiling va masjidimizning faoliyatini qo'llab-quvvatlashda ishtirok eting",
        "donation",
    ),
    ("donation_account_number", "20212000700124304001", "donation"),
    ("donation_mfo", "00901", "donation"),
    ("donation_inn", "202465253", "donation"),
    ("donation_contact_phone", "974779411", "donation"),
    (
        "donation_payme_link",
        "https://payme.uz/fallback/merchant/?id=6261544f84e4da44d89eb31c",
        "donation",
    ),
    ("donation_payme_text", "Ehson qilish", "donation"),
    ("donation_click_code", "*880*047452*summa#", "donation"),
    ("donation_click_text", "Kodni nusxalash", "donation"),
];

/// Open (and create if missing) the SQLite database file.
pub async fn connect(database_file: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(database_file)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    info!("Connected to SQLite database at: {database_file}");
    Ok(pool)
}

/// Create all tables when they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS admin_users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL,
            name TEXT NOT NULL,
            role TEXT DEFAULT 'admin',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS prayer_times (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            time TEXT NOT NULL,
            arabic TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            key TEXT UNIQUE NOT NULL,
            value TEXT NOT NULL,
            category TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            description TEXT NOT NULL,
            detailed_description TEXT,
            image TEXT,
            status TEXT DEFAULT 'active',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    debug!("Database schema ensured");
    Ok(())
}

/// Insert default rows into every table that is still empty.
///
/// The seed admin password is hashed with Argon2id before storage; the
/// plaintext from the config never reaches the database.
pub async fn seed_defaults(pool: &SqlitePool, admin: &AdminSeed) -> Result<()> {
    let admin_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_users")
        .fetch_one(pool)
        .await?;
    if admin_count == 0 {
        let password_hash = auth::hash_password(&admin.password)?;
        sqlx::query("INSERT INTO admin_users (email, password, name, role) VALUES (?, ?, ?, ?)")
            .bind(&admin.email)
            .bind(&password_hash)
            .bind(&admin.name)
            .bind("admin")
            .execute(pool)
            .await?;
        info!("Default admin user created");
    }

    let prayer_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prayer_times")
        .fetch_one(pool)
        .await?;
    if prayer_count == 0 {
        for (name, time, arabic) in DEFAULT_PRAYER_TIMES {
            sqlx::query("INSERT INTO prayer_times (name, time, arabic) VALUES (?, ?, ?)")
                .bind(name)
                .bind(time)
                .bind(arabic)
                .execute(pool)
                .await?;
        }
        info!("Default prayer times created");
    }

    let settings_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM settings")
        .fetch_one(pool)
        .await?;
    if settings_count == 0 {
        for (key, value, category) in DEFAULT_SETTINGS {
            sqlx::query("INSERT INTO settings (key, value, category) VALUES (?, ?, ?)")
                .bind(key)
                .bind(value)
                .bind(category)
                .execute(pool)
                .await?;
        }
        info!("Default settings created");
    }

    let event_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(pool)
        .await?;
    if event_count == 0 {
        let defaults = [
            NewEvent {
                title: "Juma namozi".to_string(),
                date: "2025-01-24".to_string(),
                time: "12:30".to_string(),
                description: "Haftalik jamoat namoziga qo'shiling va ilhomli nutq eshiting."
                    .to_string(),
                detailed_description: Some(
                    "Har hafta Juma kuni bo'lib o'tadigan masjid jamoasi namozi. Namozdan keyin \
                     imam tomonidan ilhomli va o'gituvchi nutq aytiladi."
                        .to_string(),
                ),
                image: Some(
                    "https://images.pexels.com/photos/8728380/pexels-photo-8728380.jpeg"
                        .to_string(),
                ),
                status: EventStatus::Active,
            },
            NewEvent {
                title: "Jamoat iftori".to_string(),
                date: "2025-01-28".to_string(),
                time: "18:00".to_string(),
                description: "Oylik jamoat kechki ovqati - oilalarni birlashtirish uchun."
                    .to_string(),
                detailed_description: Some(
                    "Har oyning oxirida bo'lib o'tadigan jamoat iftori. Barcha oilalar va \
                     jamiyat a'zolari taklif qilinadi. Ovqat bepul taqdim etiladi."
                        .to_string(),
                ),
                image: Some(
                    "https://images.pexels.com/photos/6419721/pexels-photo-6419721.jpeg"
                        .to_string(),
                ),
                status: EventStatus::Active,
            },
        ];
        for event in &defaults {
            create_event(pool, event).await?;
        }
        info!("Default events created");
    }

    Ok(())
}

const PRAYER_TIME_COLUMNS: &str = "id, name, time, arabic";

/// All five prayer entries in stored order.
pub async fn list_prayer_times(pool: &SqlitePool) -> Result<Vec<PrayerTime>> {
    let rows = sqlx::query_as::<_, PrayerTime>(&format!(
        "SELECT {PRAYER_TIME_COLUMNS} FROM prayer_times ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Replace the whole prayer-time collection: delete-all then insert-all.
///
/// Not wrapped in a transaction. Callers validate the payload first, so
/// the table is only ever replaced with a full set of 5.
pub async fn replace_prayer_times(
    pool: &SqlitePool,
    entries: &[NewPrayerTime],
) -> Result<Vec<PrayerTime>> {
    sqlx::query("DELETE FROM prayer_times").execute(pool).await?;

    for entry in entries {
        sqlx::query("INSERT INTO prayer_times (name, time, arabic) VALUES (?, ?, ?)")
            .bind(&entry.name)
            .bind(&entry.time)
            .bind(&entry.arabic)
            .execute(pool)
            .await?;
    }

    list_prayer_times(pool).await
}

const EVENT_COLUMNS: &str =
    "id, title, date, time, description, detailed_description, image, status";

/// Events with status `active`, ordered by date. The public listing.
pub async fn list_active_events(pool: &SqlitePool) -> Result<Vec<Event>> {
    let rows = sqlx::query_as::<_, Event>(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE status = 'active' ORDER BY date"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch a single event regardless of its status.
pub async fn get_event(pool: &SqlitePool, id: i64) -> Result<Event> {
    sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| MinaretError::NotFound("Event not found".to_string()))
}

/// Insert a new event and return the stored row with its assigned id.
pub async fn create_event(pool: &SqlitePool, event: &NewEvent) -> Result<Event> {
    let result = sqlx::query(
        "INSERT INTO events (title, date, time, description, detailed_description, image, status)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&event.title)
    .bind(&event.date)
    .bind(&event.time)
    .bind(&event.description)
    .bind(&event.detailed_description)
    .bind(&event.image)
    .bind(event.status)
    .execute(pool)
    .await?;

    get_event(pool, result.last_insert_rowid()).await
}

/// Overwrite every field of an existing event and return the stored row.
pub async fn update_event(pool: &SqlitePool, id: i64, event: &NewEvent) -> Result<Event> {
    let result = sqlx::query(
        "UPDATE events SET title = ?, date = ?, time = ?, description = ?,
         detailed_description = ?, image = ?, status = ?, updated_at = CURRENT_TIMESTAMP
         WHERE id = ?",
    )
    .bind(&event.title)
    .bind(&event.date)
    .bind(&event.time)
    .bind(&event.description)
    .bind(&event.detailed_description)
    .bind(&event.image)
    .bind(event.status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(MinaretError::NotFound("Event not found".to_string()));
    }

    get_event(pool, id).await
}

/// Delete an event by id.
pub async fn delete_event(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(MinaretError::NotFound("Event not found".to_string()));
    }
    Ok(())
}

/// All settings folded into a `{category: {key: value}}` map.
pub async fn grouped_settings(pool: &SqlitePool) -> Result<SettingsMap> {
    let rows = sqlx::query_as::<_, Setting>(
        "SELECT id, key, value, category FROM settings ORDER BY category, key",
    )
    .fetch_all(pool)
    .await?;

    let mut grouped: SettingsMap = BTreeMap::new();
    for row in rows {
        grouped
            .entry(row.category)
            .or_default()
            .insert(row.key, row.value);
    }
    Ok(grouped)
}

/// Upsert a batch of settings inside one transaction.
///
/// `INSERT OR REPLACE` keyed on the unique `key` column gives last-write-wins
/// semantics; writing the same key twice leaves a single row.
pub async fn upsert_settings(pool: &SqlitePool, entries: &[SettingUpsert]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for entry in entries {
        sqlx::query(
            "INSERT OR REPLACE INTO settings (key, value, category, updated_at)
             VALUES (?, ?, ?, CURRENT_TIMESTAMP)",
        )
        .bind(&entry.key)
        .bind(&entry.value)
        .bind(&entry.category)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    debug!("Upserted {} settings", entries.len());
    Ok(())
}

/// Read a single setting by key.
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Setting> {
    sqlx::query_as::<_, Setting>("SELECT id, key, value, category FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| MinaretError::NotFound("Setting not found".to_string()))
}

/// Look up the admin account by email.
pub async fn find_admin(pool: &SqlitePool, email: &str) -> Result<Option<AdminUser>> {
    let row = sqlx::query_as::<_, AdminUser>(
        "SELECT id, email, password, name, role FROM admin_users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Apply an email and/or password change to the admin account.
///
/// The caller has already re-authenticated and hashed any new password.
/// A duplicate email surfaces as a `Conflict` with the user-facing message.
pub async fn update_admin_profile(
    pool: &SqlitePool,
    id: i64,
    new_email: Option<&str>,
    new_password_hash: Option<&str>,
) -> Result<()> {
    let result = match (new_email, new_password_hash) {
        (Some(email), Some(password)) => {
            sqlx::query(
                "UPDATE admin_users SET email = ?, password = ?, updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?",
            )
            .bind(email)
            .bind(password)
            .bind(id)
            .execute(pool)
            .await
        }
        (Some(email), None) => {
            sqlx::query(
                "UPDATE admin_users SET email = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            )
            .bind(email)
            .bind(id)
            .execute(pool)
            .await
        }
        (None, Some(password)) => {
            sqlx::query(
                "UPDATE admin_users SET password = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            )
            .bind(password)
            .bind(id)
            .execute(pool)
            .await
        }
        (None, None) => {
            return Err(MinaretError::Validation(
                "Yangilanishi kerak bo'lgan ma'lumot topilmadi".to_string(),
            ))
        }
    };

    let result = result.map_err(|e| {
        if is_unique_violation(&e) {
            MinaretError::Conflict("Bu email manzil allaqachon ishlatilmoqda".to_string())
        } else {
            MinaretError::Database(e)
        }
    })?;

    if result.rows_affected() == 0 {
        return Err(MinaretError::NotFound("Foydalanuvchi topilmadi".to_string()));
    }
    Ok(())
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db) if db.message().contains("UNIQUE constraint failed")
    )
}
