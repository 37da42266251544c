pub mod sqlite_order_repo;
pub mod sqlite_venue_repo;

pub mod postgres_order_repo;
pub mod postgres_venue_repo;
