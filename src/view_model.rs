use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    sync::Arc,
};

use serde::de::DeserializeOwned;
use tokio::sync::{watch, RwLock};
use tracing::{debug, error, info, warn};

use crate::{
    error::AppError,
    format::day_anchor,
    models::{
        activity::Activity,
        trip::{ActivitiesDocument, TripInfo},
    },
    platform::{Platform, ScrollOptions},
    services::{
        clock::Clock,
        source::{Fetched, ResourceSource, ACTIVITIES_RESOURCE, TRIP_INFO_RESOURCE},
    },
};

pub const LOAD_ERROR_PREFIX: &str = "Failed to load trip data: ";

pub const UNSUPPORTED_ORIGIN_MESSAGE: &str = "This page needs to be served through a web server to work properly.
Try one of these options:
1. Leave DATA_BASE_URL unset so this server hosts DATA_DIR itself
2. Point DATA_BASE_URL at an http(s) address serving the data/ folder
3. Use 'python -m http.server' in the folder containing data/";

/// Result of one load attempt, applied to the view model in a single step.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded {
        trip_info: TripInfo,
        activities: Vec<Activity>,
    },
    UnsupportedOrigin,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState<'a> {
    Loading,
    Error(&'a str),
    Ready,
}

pub struct TripViewModel {
    clock: Arc<dyn Clock>,
    trip_info: Option<TripInfo>,
    activities: Option<Vec<Activity>>,
    expanded_days: HashMap<String, bool>,
    loading: bool,
    error: Option<String>,
    revision: watch::Sender<u64>,
}

impl fmt::Debug for TripViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TripViewModel")
            .field("loading", &self.loading)
            .field("error", &self.error)
            .field("activities", &self.activities.as_ref().map(Vec::len))
            .field("expanded_days", &self.expanded_days)
            .finish()
    }
}

impl TripViewModel {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            clock,
            trip_info: None,
            activities: None,
            expanded_days: HashMap::new(),
            loading: true,
            error: None,
            revision,
        }
    }

    pub fn trip_info(&self) -> Option<&TripInfo> {
        self.trip_info.as_ref()
    }

    pub fn activities(&self) -> &[Activity] {
        self.activities.as_deref().unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn view_state(&self) -> ViewState<'_> {
        match (&self.error, self.loading) {
            (Some(message), _) => ViewState::Error(message),
            (None, true) => ViewState::Loading,
            (None, false) => ViewState::Ready,
        }
    }

    pub fn today(&self) -> String {
        self.clock.today_iso()
    }

    pub fn finish_load(&mut self, outcome: LoadOutcome) {
        match outcome {
            LoadOutcome::Loaded {
                trip_info,
                activities,
            } => {
                let today = self.today();
                self.expanded_days = unique_dates(&activities)
                    .into_iter()
                    .map(|date| {
                        let expanded = date >= today.as_str();
                        (date.to_string(), expanded)
                    })
                    .collect();
                self.trip_info = Some(trip_info);
                self.activities = Some(activities);
                self.error = None;
            }
            LoadOutcome::UnsupportedOrigin => {
                self.error = Some(UNSUPPORTED_ORIGIN_MESSAGE.to_string());
            }
            LoadOutcome::Failed(message) => {
                self.error = Some(message);
            }
        }
        self.loading = false;
        self.notify();
    }

    /// Activities of one day, ordered by `order`; equal keys keep list order.
    pub fn day_activities(&self, date: &str) -> Vec<&Activity> {
        let mut items: Vec<&Activity> = self
            .activities()
            .iter()
            .filter(|activity| activity.date == date)
            .collect();
        items.sort_by(|a, b| a.order.total_cmp(&b.order));
        items
    }

    pub fn unique_dates(&self) -> Vec<&str> {
        unique_dates(self.activities())
    }

    pub fn toggle_day(&mut self, date: &str) {
        let expanded = self.expanded_days.entry(date.to_string()).or_insert(false);
        *expanded = !*expanded;
        debug!(date, expanded = *expanded, "day toggled");
        self.notify();
    }

    pub fn is_day_expanded(&self, date: &str) -> bool {
        self.expanded_days.get(date).copied().unwrap_or(false)
    }

    pub fn is_current_day(&self, date: &str) -> bool {
        date == self.today()
    }

    pub fn is_current_day_within_trip(&self) -> bool {
        self.trip_info
            .as_ref()
            .is_some_and(|trip| trip.dates.contains(&self.today()))
    }

    /// Post-render hook: scrolls today's section into view when today falls
    /// inside the trip window and the section was rendered.
    pub fn after_render(&self, platform: &dyn Platform) {
        if !self.is_current_day_within_trip() {
            return;
        }
        let anchor = day_anchor(&self.today());
        if platform.has_element(&anchor) {
            platform.scroll_into_view(&anchor, ScrollOptions::SMOOTH_START);
        }
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}

fn unique_dates(activities: &[Activity]) -> Vec<&str> {
    activities
        .iter()
        .map(|activity| activity.date.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Loads both documents and applies the outcome. The lock is only taken once
/// the fetches have settled.
pub async fn init(
    view: &RwLock<TripViewModel>,
    platform: &dyn Platform,
    source: &dyn ResourceSource,
) {
    let outcome = load_trip_data(platform, source).await;
    view.write().await.finish_load(outcome);
}

pub async fn load_trip_data(platform: &dyn Platform, source: &dyn ResourceSource) -> LoadOutcome {
    if !platform.is_http_origin() {
        warn!("data origin is not served over http, skipping trip data load");
        return LoadOutcome::UnsupportedOrigin;
    }

    match fetch_documents(source).await {
        Ok((trip_info, activities)) => {
            info!(activities = activities.len(), "trip data loaded");
            LoadOutcome::Loaded {
                trip_info,
                activities,
            }
        }
        Err(err) => {
            error!("error loading data: {err}");
            LoadOutcome::Failed(format!("{LOAD_ERROR_PREFIX}{err}"))
        }
    }
}

async fn fetch_documents(
    source: &dyn ResourceSource,
) -> Result<(TripInfo, Vec<Activity>), AppError> {
    let (trip, activities) = tokio::try_join!(
        source.fetch(TRIP_INFO_RESOURCE),
        source.fetch(ACTIVITIES_RESOURCE)
    )?;

    ensure_success(TRIP_INFO_RESOURCE, &trip)?;
    ensure_success(ACTIVITIES_RESOURCE, &activities)?;

    let trip_info: TripInfo = parse(TRIP_INFO_RESOURCE, &trip.body)?;
    let document: ActivitiesDocument = parse(ACTIVITIES_RESOURCE, &activities.body)?;
    let activities = document.activities.ok_or(AppError::MissingActivities {
        resource: ACTIVITIES_RESOURCE,
    })?;

    Ok((trip_info, activities))
}

fn ensure_success(resource: &'static str, fetched: &Fetched) -> Result<(), AppError> {
    if fetched.is_success() {
        Ok(())
    } else {
        Err(AppError::ResourceStatus {
            resource,
            status: fetched.status,
        })
    }
}

fn parse<T: DeserializeOwned>(resource: &'static str, body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|source| AppError::Parse { resource, source })
}
