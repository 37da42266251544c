use crate::domain::models::order::{Order, OrderState};
use crate::domain::models::page::{Page, PageRequest};
use crate::domain::ports::OrderRepository;
use crate::domain::services::scheduler::ORDER_NOT_FOUND;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

pub struct SqliteOrderRepo {
    pool: SqlitePool,
}

impl SqliteOrderRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Touching the venue row as the first statement takes SQLite's write lock
/// before anything is read, so check-then-write sequences queue up instead of
/// racing on a stale snapshot.
pub(crate) async fn lock_venue(conn: &mut SqliteConnection, venue_id: i64) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE venues SET id = id WHERE id = ?")
        .bind(venue_id)
        .execute(conn)
        .await
        .map_err(AppError::Database)?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Venue not found".into()));
    }
    Ok(())
}

/// PENDING and APPROVED orders still referencing the venue.
pub(crate) async fn count_active_orders(conn: &mut SqliteConnection, venue_id: i64) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE venue_id = ? AND state IN ('PENDING', 'APPROVED')")
        .bind(venue_id)
        .fetch_one(conn).await.map_err(AppError::Database)
}

async fn ensure_slot_free(conn: &mut SqliteConnection, order: &Order) -> Result<(), AppError> {
    let clash = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM orders
         WHERE venue_id = ? AND id != ? AND state IN ('PENDING', 'APPROVED')
           AND start_time < ? AND end_time > ?
         LIMIT 1"
    )
        .bind(order.venue_id).bind(order.id).bind(order.end_time).bind(order.start_time)
        .fetch_optional(conn).await.map_err(AppError::Database)?;

    if clash.is_some() {
        return Err(AppError::Conflict("Time slot already booked".into()));
    }
    Ok(())
}

#[async_trait]
impl OrderRepository for SqliteOrderRepo {
    async fn insert_if_free(&self, order: &Order) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_venue(&mut *tx, order.venue_id).await?;
        ensure_slot_free(&mut *tx, order).await?;

        let created = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (user_id, venue_id, order_time, start_time, end_time, hours, total, state)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&order.user_id).bind(order.venue_id).bind(order.order_time).bind(order.start_time)
            .bind(order.end_time).bind(order.hours).bind(order.total).bind(order.state.as_str())
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn update_if_free(&self, order: &Order, expected: OrderState) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_venue(&mut *tx, order.venue_id).await?;

        let state = sqlx::query_scalar::<_, String>("SELECT state FROM orders WHERE id = ?")
            .bind(order.id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.into()))?;
        if state != expected.as_str() {
            return Err(AppError::Conflict("Order state already changed".into()));
        }

        ensure_slot_free(&mut *tx, order).await?;

        let updated = sqlx::query_as::<_, Order>(
            "UPDATE orders SET venue_id=?, start_time=?, end_time=?, hours=?, total=?, state=?
             WHERE id=?
             RETURNING *"
        )
            .bind(order.venue_id).bind(order.start_time).bind(order.end_time).bind(order.hours)
            .bind(order.total).bind(order.state.as_str()).bind(order.id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, AppError> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_overlapping(&self, venue_id: i64, start: DateTime<Utc>, end: DateTime<Utc>, exclude: Option<i64>) -> Result<Vec<Order>, AppError> {
        sqlx::query_as::<_, Order>(
            "SELECT * FROM orders
             WHERE venue_id = ? AND state IN ('PENDING', 'APPROVED') AND start_time < ? AND end_time > ?
               AND (? IS NULL OR id != ?)
             ORDER BY start_time ASC"
        )
            .bind(venue_id).bind(end).bind(start).bind(exclude).bind(exclude)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_start_range(&self, venue_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Order>, AppError> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE venue_id = ? AND start_time >= ? AND start_time < ? ORDER BY start_time ASC")
            .bind(venue_id).bind(start).bind(end).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_user(&self, user_id: &str, page: PageRequest) -> Result<Page<Order>, AppError> {
        let sql = format!("SELECT * FROM orders WHERE user_id = ? ORDER BY order_time {}, id {} LIMIT ? OFFSET ?", page.sort.as_sql(), page.sort.as_sql());
        let items = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id).bind(page.limit()).bind(page.offset())
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE user_id = ?")
            .bind(user_id).fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(Page::new(items, total, page))
    }

    async fn find_by_state(&self, state: OrderState, page: PageRequest) -> Result<Page<Order>, AppError> {
        let sql = format!("SELECT * FROM orders WHERE state = ? ORDER BY order_time {}, id {} LIMIT ? OFFSET ?", page.sort.as_sql(), page.sort.as_sql());
        let items = sqlx::query_as::<_, Order>(&sql)
            .bind(state.as_str()).bind(page.limit()).bind(page.offset())
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE state = ?")
            .bind(state.as_str()).fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(Page::new(items, total, page))
    }

    async fn find_by_states(&self, states: &[OrderState]) -> Result<Vec<Order>, AppError> {
        if states.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; states.len()].join(", ");
        let sql = format!("SELECT * FROM orders WHERE state IN ({}) ORDER BY start_time ASC", placeholders);
        let mut query = sqlx::query_as::<_, Order>(&sql);
        for state in states {
            query = query.bind(state.as_str());
        }
        query.fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn transition_state(&self, id: i64, from: OrderState, to: OrderState) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE orders SET state = ? WHERE id = ? AND state = ?")
            .bind(to.as_str()).bind(id).bind(from.as_str())
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_active(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ? AND state IN ('PENDING', 'APPROVED')")
            .bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
