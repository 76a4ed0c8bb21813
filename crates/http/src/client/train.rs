//! Train search and seat maps

use super::{ClientError, RailClient};
use crate::types::{
    CalendarDay, ScheduleSearchRequest, ScheduleSearchResult, SeatMap, SeatMapRequest,
    TrainCarSearchRequest, TrainCarSearchResult,
};

impl RailClient {
    /// Operation dates open for search
    pub async fn train_calendar(&self) -> Result<Vec<CalendarDay>, ClientError> {
        let req = self.request(reqwest::Method::GET, "/api/v1/trains/search/calendar");
        self.execute_result(req).await
    }

    /// Page of train schedules between two stations
    pub async fn search_schedules(
        &self,
        request: &ScheduleSearchRequest,
    ) -> Result<ScheduleSearchResult, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/api/v1/trains/search/schedule")
            .json(request);
        self.execute_result(req).await
    }

    /// Cars of one scheduled train with their remaining seats
    pub async fn search_cars(
        &self,
        request: &TrainCarSearchRequest,
    ) -> Result<TrainCarSearchResult, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/api/v1/trains/search/cars")
            .json(request);
        self.execute_result(req).await
    }

    pub async fn seat_map(&self, request: &SeatMapRequest) -> Result<SeatMap, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/api/v1/trains/seats/detail")
            .json(request);
        self.execute_result(req).await
    }
}
