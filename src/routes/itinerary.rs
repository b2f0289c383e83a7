use std::time::Duration;

use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    format::{activity_icon, day_anchor, format_date, format_note},
    models::activity::Activity,
    state::AppState,
    view_model::{TripViewModel, ViewState},
};

const CHANGES_LONG_POLL: Duration = Duration::from_secs(25);

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(itinerary_page))
        .route("/days/:date/toggle", post(toggle_day))
        .route("/api/changes", get(changes))
}

struct DayView {
    date: String,
    anchor: String,
    label: String,
    expanded: bool,
    is_today: bool,
    activities: Vec<ActivityView>,
}

struct ActivityView {
    icon: String,
    title: Option<String>,
    time: Option<String>,
    location: Option<String>,
    note_html: Option<String>,
}

impl ActivityView {
    fn from_activity(activity: &Activity) -> Self {
        Self {
            icon: activity_icon(activity).to_string(),
            title: activity.title(),
            time: activity.text_field("time"),
            location: activity.text_field("location"),
            note_html: activity
                .note
                .as_deref()
                .filter(|note| !note.trim().is_empty())
                .map(format_note),
        }
    }
}

#[derive(Template)]
#[template(path = "itinerary/page.html")]
struct ItineraryTemplate {
    title: String,
    loading: bool,
    error: Option<String>,
    revision: u64,
    within_trip: bool,
    days: Vec<DayView>,
    scroll_script: Option<String>,
}

async fn itinerary_page(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.view.read().await;

    let (loading, error) = match view.view_state() {
        ViewState::Loading => (true, None),
        ViewState::Error(message) => (false, Some(message.to_string())),
        ViewState::Ready => (false, None),
    };
    let days = if loading || error.is_some() {
        Vec::new()
    } else {
        build_days(&view)
    };

    let page = state
        .platform()
        .with_elements(days.iter().map(|day| day.anchor.clone()));
    view.after_render(&page);

    AskamaTemplateResponse::into_response(ItineraryTemplate {
        title: view
            .trip_info()
            .and_then(|trip| trip.title())
            .unwrap_or("Trip itinerary")
            .to_string(),
        loading,
        error,
        revision: view.revision(),
        within_trip: view.is_current_day_within_trip(),
        days,
        scroll_script: page.take_scroll().map(|request| request.script()),
    })
}

fn build_days(view: &TripViewModel) -> Vec<DayView> {
    view.unique_dates()
        .into_iter()
        .map(|date| DayView {
            date: date.to_string(),
            anchor: day_anchor(date),
            label: format_date(date).unwrap_or_else(|| date.to_string()),
            expanded: view.is_day_expanded(date),
            is_today: view.is_current_day(date),
            activities: view
                .day_activities(date)
                .into_iter()
                .map(ActivityView::from_activity)
                .collect(),
        })
        .collect()
}

async fn toggle_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Redirect, AppError> {
    let mut view = state.view.write().await;
    if !view.unique_dates().contains(&date.as_str()) {
        return Err(AppError::NotFound);
    }
    view.toggle_day(&date);
    Ok(Redirect::to(&format!("/#{}", day_anchor(&date))))
}

#[derive(Deserialize)]
struct ChangesQuery {
    since: Option<u64>,
}

#[derive(Serialize)]
struct ChangesResponse {
    revision: u64,
}

/// Long-polls until the view model moves past `since` or the poll times out.
async fn changes(
    State(state): State<AppState>,
    Query(query): Query<ChangesQuery>,
) -> Json<ChangesResponse> {
    let mut receiver = state.view.read().await.subscribe();
    let since = query.since.unwrap_or(0);
    if *receiver.borrow_and_update() <= since {
        let _ = tokio::time::timeout(CHANGES_LONG_POLL, receiver.changed()).await;
    }
    let revision = *receiver.borrow();
    Json(ChangesResponse { revision })
}
