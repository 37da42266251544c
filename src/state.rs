use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{OrderRepository, VenueRepository};
use crate::domain::services::scheduler::BookingScheduler;
use crate::domain::services::venue_service::VenueService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub venue_repo: Arc<dyn VenueRepository>,
    pub order_repo: Arc<dyn OrderRepository>,
    pub scheduler: Arc<BookingScheduler>,
    pub venue_service: Arc<VenueService>,
}

impl AppState {
    pub fn new(
        config: Config,
        venue_repo: Arc<dyn VenueRepository>,
        order_repo: Arc<dyn OrderRepository>,
    ) -> Self {
        let scheduler = Arc::new(BookingScheduler::new(order_repo.clone(), venue_repo.clone(), config.timezone));
        let venue_service = Arc::new(VenueService::new(venue_repo.clone()));
        Self { config, venue_repo, order_repo, scheduler, venue_service }
    }
}
