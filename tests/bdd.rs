use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use cucumber::{given, then, when, World as _};
use itinerary::{
    error::AppError,
    format::day_anchor,
    platform::PagePlatform,
    services::{
        clock::FixedClock,
        source::{Fetched, ResourceSource, ACTIVITIES_RESOURCE, TRIP_INFO_RESOURCE},
    },
    view_model::{self, TripViewModel},
};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use url::Url;

#[derive(Debug, cucumber::World)]
struct TripWorld {
    trip: Option<(String, String)>,
    today: Option<NaiveDate>,
    origin: String,
    activities: Vec<Value>,
    status_overrides: HashMap<String, u16>,
    fetches: Arc<AtomicUsize>,
    view: Option<TripViewModel>,
    scrolled_to: Option<String>,
}

impl Default for TripWorld {
    fn default() -> Self {
        Self {
            trip: None,
            today: None,
            origin: "http://trip.test/".into(),
            activities: Vec::new(),
            status_overrides: HashMap::new(),
            fetches: Arc::new(AtomicUsize::new(0)),
            view: None,
            scrolled_to: None,
        }
    }
}

impl TripWorld {
    fn view(&self) -> &TripViewModel {
        self.view.as_ref().expect("trip data must be loaded first")
    }

    fn view_mut(&mut self) -> &mut TripViewModel {
        self.view.as_mut().expect("trip data must be loaded first")
    }
}

struct MemorySource {
    documents: HashMap<&'static str, (u16, String)>,
    fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl ResourceSource for MemorySource {
    async fn fetch(&self, resource: &'static str) -> Result<Fetched, AppError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let (status, body) = self
            .documents
            .get(resource)
            .cloned()
            .unwrap_or((404, String::new()));
        Ok(Fetched {
            status,
            body: body.into_bytes(),
        })
    }
}

fn parse_date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid ISO date")
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[given(regex = r#"^a trip from "([^"]+)" to "([^"]+)"$"#)]
async fn given_trip(world: &mut TripWorld, start: String, end: String) {
    world.trip = Some((start, end));
}

#[given(regex = r#"^today is "([^"]+)"$"#)]
async fn given_today(world: &mut TripWorld, today: String) {
    world.today = Some(parse_date(&today));
}

#[given(regex = r#"^one activity on every day from "([^"]+)" to "([^"]+)"$"#)]
async fn given_daily_activities(world: &mut TripWorld, start: String, end: String) {
    let end = parse_date(&end);
    let mut day = parse_date(&start);
    while day <= end {
        world.activities.push(json!({
            "date": day.format("%Y-%m-%d").to_string(),
            "order": 1,
            "title": format!("Plans for {day}"),
        }));
        day += Duration::days(1);
    }
}

#[given(regex = r#"^an activity "([^"]+)" on "([^"]+)" with order (\d+)$"#)]
async fn given_activity(world: &mut TripWorld, title: String, date: String, order: u32) {
    world.activities.push(json!({
        "date": date,
        "order": order,
        "title": title,
    }));
}

#[given(regex = r#"^"([^"]+)" responds with status (\d+)$"#)]
async fn given_status(world: &mut TripWorld, resource: String, status: u16) {
    world.status_overrides.insert(resource, status);
}

#[given(regex = r#"^the data origin is "([^"]+)"$"#)]
async fn given_origin(world: &mut TripWorld, origin: String) {
    world.origin = origin;
}

#[when("the trip data is loaded")]
async fn when_loaded(world: &mut TripWorld) {
    let (start, end) = world.trip.clone().expect("trip window must be set");
    let mut documents = HashMap::new();
    for (resource, body) in [
        (
            TRIP_INFO_RESOURCE,
            json!({"title": "Test trip", "dates": {"start": start, "end": end}}),
        ),
        (ACTIVITIES_RESOURCE, json!({"activities": world.activities})),
    ] {
        let status = world.status_overrides.get(resource).copied().unwrap_or(200);
        documents.insert(resource, (status, body.to_string()));
    }
    let source = MemorySource {
        documents,
        fetches: world.fetches.clone(),
    };

    let today = world.today.expect("today must be set");
    let view = RwLock::new(TripViewModel::new(Arc::new(FixedClock(today))));
    let origin = Url::parse(&world.origin).expect("valid origin");
    view_model::init(&view, &PagePlatform::for_origin(origin.clone()), &source).await;

    let view = view.into_inner();
    let page = PagePlatform::for_origin(origin)
        .with_elements(view.unique_dates().into_iter().map(day_anchor));
    view.after_render(&page);
    world.scrolled_to = page.take_scroll().map(|request| request.element_id);
    world.view = Some(view);
}

#[when(regex = r#"^I toggle the day "([^"]+)" twice$"#)]
async fn when_toggle_twice(world: &mut TripWorld, date: String) {
    world.view_mut().toggle_day(&date);
    world.view_mut().toggle_day(&date);
}

#[then("loading has finished")]
async fn then_loading_finished(world: &mut TripWorld) {
    assert!(!world.view().is_loading());
}

#[then("loading has finished without an error")]
async fn then_loaded_cleanly(world: &mut TripWorld) {
    assert!(!world.view().is_loading());
    assert_eq!(world.view().error(), None);
}

#[then("the current day is within the trip")]
async fn then_within_trip(world: &mut TripWorld) {
    assert!(world.view().is_current_day_within_trip());
}

#[then("the current day is not within the trip")]
async fn then_not_within_trip(world: &mut TripWorld) {
    assert!(!world.view().is_current_day_within_trip());
}

#[then(regex = r#"^the days "([^"]+)" are collapsed$"#)]
async fn then_collapsed(world: &mut TripWorld, dates: String) {
    for date in split_list(&dates) {
        assert!(!world.view().is_day_expanded(&date), "{date} should be collapsed");
    }
}

#[then(regex = r#"^the days "([^"]+)" are expanded$"#)]
async fn then_expanded(world: &mut TripWorld, dates: String) {
    for date in split_list(&dates) {
        assert!(world.view().is_day_expanded(&date), "{date} should be expanded");
    }
}

#[then(regex = r#"^the page scrolls to "([^"]+)"$"#)]
async fn then_scrolls(world: &mut TripWorld, anchor: String) {
    assert_eq!(world.scrolled_to.as_deref(), Some(anchor.as_str()));
}

#[then("the page does not scroll")]
async fn then_no_scroll(world: &mut TripWorld) {
    assert_eq!(world.scrolled_to, None);
}

#[then(regex = r#"^the error mentions "([^"]+)" and "([^"]+)"$"#)]
async fn then_error_mentions(world: &mut TripWorld, first: String, second: String) {
    let message = world.view().error().expect("an error message");
    assert!(message.contains(&first), "{message:?} lacks {first:?}");
    assert!(message.contains(&second), "{message:?} lacks {second:?}");
}

#[then("no trip info is shown")]
async fn then_no_trip_info(world: &mut TripWorld) {
    assert!(world.view().trip_info().is_none());
    assert!(world.view().unique_dates().is_empty());
}

#[then(regex = r#"^the activities on "([^"]+)" are "([^"]+)"$"#)]
async fn then_activity_order(world: &mut TripWorld, date: String, expected: String) {
    let titles: Vec<String> = world
        .view()
        .day_activities(&date)
        .into_iter()
        .filter_map(|activity| activity.title())
        .collect();
    assert_eq!(titles, split_list(&expected));
}

#[then("no resource was fetched")]
async fn then_nothing_fetched(world: &mut TripWorld) {
    assert_eq!(world.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::main]
async fn main() {
    TripWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}
