use venue_booking::{
    api::router::create_router,
    config::Config,
    domain::models::venue::{NewVenue, Venue},
    infra::repositories::{sqlite_order_repo::SqliteOrderRepo, sqlite_venue_repo::SqliteVenueRepo},
    state::AppState,
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde_json::Value;
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

#[allow(dead_code)]
pub const USER: &str = "alice";
#[allow(dead_code)]
pub const OTHER_USER: &str = "bob";
#[allow(dead_code)]
pub const ADMIN: &str = "root";

#[allow(dead_code)]
pub enum Caller<'a> {
    Anonymous,
    User(&'a str),
    Admin(&'a str),
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(16)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            timezone: chrono_tz::UTC,
            log_dir: "./logs".to_string(),
        };

        let state = Arc::new(AppState::new(
            config,
            Arc::new(SqliteVenueRepo::new(pool.clone())),
            Arc::new(SqliteOrderRepo::new(pool.clone())),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    /// Creates a venue open `open`..`close` (HH:MM) at `price` per hour.
    #[allow(dead_code)]
    pub async fn seed_venue(&self, name: &str, price: i64, open: &str, close: &str) -> Venue {
        self.state.venue_service.create(NewVenue {
            name: name.to_string(),
            description: format!("{} description", name),
            address: "1 Stadium Road".to_string(),
            price,
            open_time: open.to_string(),
            close_time: close.to_string(),
        }).await.expect("Failed to seed venue")
    }

    #[allow(dead_code)]
    pub async fn request(&self, method: &str, uri: &str, caller: Caller<'_>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        match caller {
            Caller::Anonymous => {}
            Caller::User(id) => builder = builder.header("X-User-Id", id),
            Caller::Admin(id) => builder = builder.header("X-User-Id", id).header("X-User-Role", "admin"),
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

/// `hour`:00 UTC, `days` days from today.
#[allow(dead_code)]
pub fn day_at(days: i64, hour: u32) -> DateTime<Utc> {
    let date = Utc::now().date_naive() + Duration::days(days);
    date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap()).and_utc()
}

#[allow(dead_code)]
pub fn tomorrow_at(hour: u32) -> DateTime<Utc> {
    day_at(1, hour)
}
