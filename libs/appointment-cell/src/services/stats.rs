// libs/appointment-cell/src/services/stats.rs
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentSearchQuery, AppointmentStats, StatusBreakdown};
use crate::store::AppointmentStore;

/// Read-side aggregator for the operational dashboard: status tallies over
/// fixed calendar windows plus a count of urgent upcoming appointments.
pub struct StatisticsService {
    store: Arc<dyn AppointmentStore>,
}

impl StatisticsService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    pub async fn get_stats(&self, facility_id: Option<Uuid>) -> AppointmentStats {
        self.stats_at(Utc::now(), facility_id).await
    }

    /// Stats relative to an explicit reference time. Weeks start on Monday.
    pub async fn stats_at(&self, now: DateTime<Utc>, facility_id: Option<Uuid>) -> AppointmentStats {
        let today = now.date_naive();
        let day_start = today
            .and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc())
            .unwrap_or(now);
        let day_end = day_start + Duration::days(1);

        let week_start =
            day_start - Duration::days(today.weekday().num_days_from_monday() as i64);
        let next_week_start = week_start + Duration::days(7);
        let next_week_end = next_week_start + Duration::days(7);

        let this_week = self
            .appointments_in(week_start, next_week_start, facility_id)
            .await;
        let next_week = self
            .appointments_in(next_week_start, next_week_end, facility_id)
            .await;

        let urgent_query = AppointmentSearchQuery {
            from_date: Some(now),
            facility_id,
            ..Default::default()
        };
        let urgent_upcoming = self
            .store
            .search(&urgent_query)
            .await
            .iter()
            .filter(|a| a.is_urgent && a.is_active())
            .count() as u64;

        let stats = AppointmentStats {
            today: StatusBreakdown::tally(
                this_week
                    .iter()
                    .filter(|a| a.scheduled_at >= day_start && a.scheduled_at < day_end),
            ),
            this_week: StatusBreakdown::tally(this_week.iter()),
            next_week: StatusBreakdown::tally(next_week.iter()),
            urgent_upcoming,
        };

        debug!(
            "Stats: {} today, {} this week, {} next week, {} urgent upcoming",
            stats.today.total, stats.this_week.total, stats.next_week.total, stats.urgent_upcoming
        );
        stats
    }

    async fn appointments_in(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        facility_id: Option<Uuid>,
    ) -> Vec<Appointment> {
        self.store
            .starting_in_range(from, to)
            .await
            .into_iter()
            .filter(|a| facility_id.map_or(true, |f| a.facility_id == Some(f)))
            .collect()
    }
}
