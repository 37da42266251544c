use crate::domain::models::order::{Order, OrderState};
use crate::domain::models::page::{Page, PageRequest};
use crate::domain::ports::OrderRepository;
use crate::domain::services::scheduler::ORDER_NOT_FOUND;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

pub struct PostgresOrderRepo {
    pool: PgPool,
}

impl PostgresOrderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row lock on the venue serialises every slot write for that venue until commit.
pub(crate) async fn lock_venue(conn: &mut PgConnection, venue_id: i64) -> Result<(), AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM venues WHERE id = $1 FOR UPDATE")
        .bind(venue_id)
        .fetch_optional(conn)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound("Venue not found".into()))?;
    Ok(())
}

/// PENDING and APPROVED orders still referencing the venue.
pub(crate) async fn count_active_orders(conn: &mut PgConnection, venue_id: i64) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE venue_id = $1 AND state IN ('PENDING', 'APPROVED')")
        .bind(venue_id)
        .fetch_one(conn).await.map_err(AppError::Database)
}

async fn ensure_slot_free(conn: &mut PgConnection, order: &Order) -> Result<(), AppError> {
    let clash = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM orders
         WHERE venue_id = $1 AND id <> $2 AND state IN ('PENDING', 'APPROVED')
           AND start_time < $3 AND end_time > $4
         LIMIT 1"
    )
        .bind(order.venue_id).bind(order.id).bind(order.end_time).bind(order.start_time)
        .fetch_optional(conn).await.map_err(AppError::Database)?;

    if clash.is_some() {
        return Err(AppError::Conflict("Time slot already booked".into()));
    }
    Ok(())
}

fn state_names(states: &[OrderState]) -> Vec<String> {
    states.iter().map(|s| s.as_str().to_string()).collect()
}

#[async_trait]
impl OrderRepository for PostgresOrderRepo {
    async fn insert_if_free(&self, order: &Order) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_venue(&mut *tx, order.venue_id).await?;
        ensure_slot_free(&mut *tx, order).await?;

        let created = sqlx::query_as::<_, Order>("INSERT INTO orders (user_id, venue_id, order_time, start_time, end_time, hours, total, state) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *")
            .bind(&order.user_id).bind(order.venue_id).bind(order.order_time).bind(order.start_time)
            .bind(order.end_time).bind(order.hours).bind(order.total).bind(order.state.as_str())
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn update_if_free(&self, order: &Order, expected: OrderState) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_venue(&mut *tx, order.venue_id).await?;

        let state = sqlx::query_scalar::<_, String>("SELECT state FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order.id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.into()))?;
        if state != expected.as_str() {
            return Err(AppError::Conflict("Order state already changed".into()));
        }

        ensure_slot_free(&mut *tx, order).await?;

        let updated = sqlx::query_as::<_, Order>("UPDATE orders SET venue_id=$1, start_time=$2, end_time=$3, hours=$4, total=$5, state=$6 WHERE id=$7 RETURNING *")
            .bind(order.venue_id).bind(order.start_time).bind(order.end_time).bind(order.hours)
            .bind(order.total).bind(order.state.as_str()).bind(order.id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, AppError> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_overlapping(&self, venue_id: i64, start: DateTime<Utc>, end: DateTime<Utc>, exclude: Option<i64>) -> Result<Vec<Order>, AppError> {
        sqlx::query_as::<_, Order>(
            "SELECT * FROM orders
             WHERE venue_id = $1 AND state IN ('PENDING', 'APPROVED') AND start_time < $2 AND end_time > $3
               AND ($4::BIGINT IS NULL OR id <> $4)
             ORDER BY start_time ASC"
        )
            .bind(venue_id).bind(end).bind(start).bind(exclude)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_start_range(&self, venue_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Order>, AppError> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE venue_id = $1 AND start_time >= $2 AND start_time < $3 ORDER BY start_time ASC")
            .bind(venue_id).bind(start).bind(end).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_user(&self, user_id: &str, page: PageRequest) -> Result<Page<Order>, AppError> {
        let sql = format!("SELECT * FROM orders WHERE user_id = $1 ORDER BY order_time {}, id {} LIMIT $2 OFFSET $3", page.sort.as_sql(), page.sort.as_sql());
        let items = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id).bind(page.limit()).bind(page.offset())
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id).fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(Page::new(items, total, page))
    }

    async fn find_by_state(&self, state: OrderState, page: PageRequest) -> Result<Page<Order>, AppError> {
        let sql = format!("SELECT * FROM orders WHERE state = $1 ORDER BY order_time {}, id {} LIMIT $2 OFFSET $3", page.sort.as_sql(), page.sort.as_sql());
        let items = sqlx::query_as::<_, Order>(&sql)
            .bind(state.as_str()).bind(page.limit()).bind(page.offset())
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE state = $1")
            .bind(state.as_str()).fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(Page::new(items, total, page))
    }

    async fn find_by_states(&self, states: &[OrderState]) -> Result<Vec<Order>, AppError> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE state = ANY($1) ORDER BY start_time ASC")
            .bind(state_names(states))
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn transition_state(&self, id: i64, from: OrderState, to: OrderState) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE orders SET state = $1 WHERE id = $2 AND state = $3")
            .bind(to.as_str()).bind(id).bind(from.as_str())
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_active(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND state IN ('PENDING', 'APPROVED')")
            .bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
