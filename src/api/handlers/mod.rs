pub mod health;
pub mod moderation;
pub mod order;
pub mod venue;
