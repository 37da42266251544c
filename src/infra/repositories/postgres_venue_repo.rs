use crate::domain::models::page::{Page, PageRequest};
use crate::domain::models::venue::Venue;
use crate::domain::ports::VenueRepository;
use crate::error::AppError;
use crate::infra::repositories::postgres_order_repo::{count_active_orders, lock_venue};
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresVenueRepo {
    pool: PgPool,
}

impl PostgresVenueRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VenueRepository for PostgresVenueRepo {
    async fn create(&self, venue: &Venue) -> Result<Venue, AppError> {
        sqlx::query_as::<_, Venue>(
            "INSERT INTO venues (name, description, address, price, open_time, close_time, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *"
        )
            .bind(&venue.name)
            .bind(&venue.description)
            .bind(&venue.address)
            .bind(venue.price)
            .bind(venue.open_time)
            .bind(venue.close_time)
            .bind(venue.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Venue>, AppError> {
        sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Venue>, AppError> {
        sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_by_name(&self, name: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM venues WHERE name = $1")
            .bind(name)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Venue>, AppError> {
        let sql = format!("SELECT * FROM venues ORDER BY id {} LIMIT $1 OFFSET $2", page.sort.as_sql());
        let items = sqlx::query_as::<_, Venue>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM venues")
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(Page::new(items, total, page))
    }

    async fn list_all(&self) -> Result<Vec<Venue>, AppError> {
        sqlx::query_as::<_, Venue>("SELECT * FROM venues ORDER BY name ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, venue: &Venue) -> Result<Venue, AppError> {
        sqlx::query_as::<_, Venue>(
            "UPDATE venues SET name=$1, description=$2, address=$3, price=$4, open_time=$5, close_time=$6 WHERE id=$7 RETURNING *"
        )
            .bind(&venue.name)
            .bind(&venue.description)
            .bind(&venue.address)
            .bind(venue.price)
            .bind(venue.open_time)
            .bind(venue.close_time)
            .bind(venue.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Venue not found".into()))
    }

    async fn delete_if_idle(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_venue(&mut *tx, id).await?;

        let active = count_active_orders(&mut *tx, id).await?;
        if active > 0 {
            return Err(AppError::Conflict("Venue has active orders".into()));
        }

        sqlx::query("DELETE FROM venues WHERE id = $1")
            .bind(id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
