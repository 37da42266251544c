use crate::domain::models::page::{Page, PageRequest};
use crate::domain::models::venue::{NewVenue, Venue};
use crate::domain::ports::VenueRepository;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

/// Admin maintenance of the venue catalog.
pub struct VenueService {
    venues: Arc<dyn VenueRepository>,
}

impl VenueService {
    pub fn new(venues: Arc<dyn VenueRepository>) -> Self {
        Self { venues }
    }

    pub async fn create(&self, draft: NewVenue) -> Result<Venue, AppError> {
        let venue = Venue::new(draft)?;
        if self.venues.count_by_name(&venue.name).await? > 0 {
            return Err(AppError::Conflict("Venue name already exists".into()));
        }

        let created = self.venues.create(&venue).await?;
        info!("Venue created: {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn update(&self, id: i64, draft: NewVenue) -> Result<Venue, AppError> {
        let mut venue = self.require(id).await?;
        venue.apply(draft)?;

        if let Some(other) = self.venues.find_by_name(&venue.name).await?
            && other.id != id {
            return Err(AppError::Conflict("Venue name already exists".into()));
        }

        let updated = self.venues.update(&venue).await?;
        info!("Venue updated: {} ({})", updated.name, updated.id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.venues.delete_if_idle(id).await?;
        info!("Venue deleted: {}", id);
        Ok(())
    }

    pub async fn is_name_available(&self, name: &str) -> Result<bool, AppError> {
        Ok(self.venues.count_by_name(name.trim()).await? == 0)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Venue>, AppError> {
        self.venues.find_by_id(id).await
    }

    pub async fn require(&self, id: i64) -> Result<Venue, AppError> {
        self.venues.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Venue not found".into()))
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<Venue>, AppError> {
        self.venues.list(page.normalized()).await
    }

    pub async fn list_all(&self) -> Result<Vec<Venue>, AppError> {
        self.venues.list_all().await
    }
}
