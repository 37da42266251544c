use serde::Serialize;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn new(status: &'static str) -> Self {
        Self { status }
    }
}

#[derive(Serialize)]
pub struct NameAvailabilityResponse {
    pub name: String,
    pub available: bool,
}
