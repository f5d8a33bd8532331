//! Marketplace filters over reconstructed events.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::TicketedEvent;

/// Date window relative to now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DateWindow {
    /// No restriction.
    #[default]
    All,
    /// Same calendar day (UTC).
    Today,
    /// Within the next 7 days.
    Week,
    /// Same calendar month (UTC).
    Month,
}

/// Price restriction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PriceFilter {
    /// No restriction.
    #[default]
    All,
    /// Price of zero.
    Free,
    /// Non-zero price.
    Paid,
}

/// Filter applied to the reconstructed event list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventQuery {
    /// Drop events whose date is not after now.
    pub upcoming_only: bool,
    /// Date window.
    pub date: DateWindow,
    /// Price restriction.
    pub price: PriceFilter,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            upcoming_only: true,
            date: DateWindow::All,
            price: PriceFilter::All,
        }
    }
}

impl DateWindow {
    fn admits(self, date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Today => date.date_naive() == now.date_naive(),
            Self::Week => date >= now && date <= now + Duration::days(7),
            Self::Month => date.year() == now.year() && date.month() == now.month(),
        }
    }
}

impl EventQuery {
    /// Returns `true` if `event` passes every filter at time `now`.
    #[must_use]
    pub fn matches(&self, event: &TicketedEvent, now: DateTime<Utc>) -> bool {
        if self.upcoming_only && !event.is_upcoming(now) {
            return false;
        }
        let price_ok = match self.price {
            PriceFilter::All => true,
            PriceFilter::Free => event.price.is_zero(),
            PriceFilter::Paid => !event.price.is_zero(),
        };
        price_ok && self.date.admits(event.date, now)
    }

    /// Filters `events` and sorts them by date, then id.
    #[must_use]
    pub fn apply(&self, events: Vec<TicketedEvent>, now: DateTime<Utc>) -> Vec<TicketedEvent> {
        let mut kept: Vec<TicketedEvent> = events
            .into_iter()
            .filter(|e| self.matches(e, now))
            .collect();
        kept.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        kept
    }
}
