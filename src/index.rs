//! Renders the public landing page.
//!
//! One server-rendered view of the current store state: prayer times with
//! the derived "next prayer", active events, and the donation block. Live
//! updates after load come from the push channel via `/static/app.js`.

use crate::error::Result;
use crate::schedule;
use crate::server::AppState;
use crate::store::{self, Event, PrayerTime};
use askama::Template;
use axum::extract::State;
use tracing::debug;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    site_name: String,
    prayer_times: Vec<PrayerTime>,
    next_prayer: Option<String>,
    is_prayer_now: bool,
    events: Vec<Event>,
    donation: DonationBlock,
}

/// Donation settings the landing page displays.
#[derive(Default)]
pub struct DonationBlock {
    pub title: String,
    pub description: String,
    pub account_number: String,
    pub payme_link: String,
    pub payme_text: String,
}

pub async fn landing_page(State(state): State<AppState>) -> Result<IndexTemplate> {
    debug!("Generating landing page");

    let prayer_times = store::list_prayer_times(&state.pool).await?;
    let events = store::list_active_events(&state.pool).await?;
    let settings = store::grouped_settings(&state.pool).await?;

    let now = chrono::Local::now().time();
    let next_prayer = schedule::next_prayer(&prayer_times, now).map(|p| p.name.clone());
    let is_prayer_now = schedule::is_prayer_window(&prayer_times, now);

    let donation = settings
        .get("donation")
        .map(|entries| {
            let field = |key: &str| entries.get(key).cloned().unwrap_or_default();
            DonationBlock {
                title: field("donation_title"),
                description: field("donation_description"),
                account_number: field("donation_account_number"),
                payme_link: field("donation_payme_link"),
                payme_text: field("donation_payme_text"),
            }
        })
        .unwrap_or_default();

    Ok(IndexTemplate {
        site_name: state.config.site_name.clone(),
        prayer_times,
        next_prayer,
        is_prayer_now,
        events,
        donation,
    })
}
