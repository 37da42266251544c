pub mod order;
pub mod page;
pub mod venue;
