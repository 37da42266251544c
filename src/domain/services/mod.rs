pub mod availability;
pub mod rules;
pub mod scheduler;
pub mod venue_service;
