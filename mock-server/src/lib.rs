//! In-memory stand-in for the subset of the Meetup REST API the client
//! exercises. Every route demands a non-empty `key` parameter, the same way
//! the real API rejects unkeyed requests, and answers with Meetup-shaped
//! JSON from a seeded directory.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Form, FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub shortname: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct City {
    pub id: u64,
    pub city: String,
    pub country: String,
    pub member_count: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Group {
    pub urlname: String,
    pub name: String,
    pub members: u64,
    pub who: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub status: String,
    pub yes_rsvp_count: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Board {
    pub id: u64,
    pub name: String,
    pub discussion_count: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Discussion {
    pub id: u64,
    pub board_id: u64,
    pub subject: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Venue {
    pub id: u64,
    pub name: String,
    pub city: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rsvp {
    pub id: Uuid,
    pub event_id: String,
    pub response: String,
}

/// Meetup v2-style error payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub problem: String,
}

impl ApiErrorBody {
    fn auth_fail() -> Self {
        Self {
            code: "auth_fail".to_string(),
            problem: "Invalid or missing API key".to_string(),
        }
    }

    fn not_found(problem: &str) -> Self {
        Self {
            code: "not_found".to_string(),
            problem: problem.to_string(),
        }
    }
}

type ErrorResponse = (StatusCode, Json<ApiErrorBody>);

fn not_found(problem: &str) -> ErrorResponse {
    (StatusCode::NOT_FOUND, Json(ApiErrorBody::not_found(problem)))
}

/// Everything known about one group.
#[derive(Clone, Debug)]
pub struct GroupRecord {
    pub group: Group,
    pub events: Vec<Event>,
    pub boards: Vec<Board>,
    pub discussions: Vec<Discussion>,
    pub members: Vec<Member>,
    pub venues: Vec<Venue>,
}

/// Seeded server state. RSVPs are the only part that mutates.
#[derive(Clone, Debug)]
pub struct Directory {
    pub categories: Vec<Category>,
    pub cities: Vec<City>,
    pub groups: HashMap<String, GroupRecord>,
    pub rsvps: Vec<Rsvp>,
}

impl Directory {
    pub fn seeded() -> Self {
        let mut groups = HashMap::new();
        groups.insert(
            "rust-nyc".to_string(),
            GroupRecord {
                group: Group {
                    urlname: "rust-nyc".to_string(),
                    name: "Rust NYC".to_string(),
                    members: 2400,
                    who: "Rustaceans".to_string(),
                },
                events: vec![
                    Event {
                        id: "236512345".to_string(),
                        name: "Ownership Deep Dive".to_string(),
                        status: "upcoming".to_string(),
                        yes_rsvp_count: 58,
                    },
                    Event {
                        id: "240098712".to_string(),
                        name: "Async in Production".to_string(),
                        status: "upcoming".to_string(),
                        yes_rsvp_count: 112,
                    },
                ],
                boards: vec![Board {
                    id: 7,
                    name: "General".to_string(),
                    discussion_count: 2,
                }],
                discussions: vec![
                    Discussion {
                        id: 301,
                        board_id: 7,
                        subject: "Meetup locations".to_string(),
                    },
                    Discussion {
                        id: 302,
                        board_id: 7,
                        subject: "Talk proposals".to_string(),
                    },
                ],
                members: vec![
                    Member {
                        id: 512,
                        name: "Ada".to_string(),
                    },
                    Member {
                        id: 733,
                        name: "Grace".to_string(),
                    },
                ],
                venues: vec![Venue {
                    id: 25001876,
                    name: "Recurse Center".to_string(),
                    city: "New York".to_string(),
                }],
            },
        );
        groups.insert(
            "papers-we-love".to_string(),
            GroupRecord {
                group: Group {
                    urlname: "papers-we-love".to_string(),
                    name: "Papers We Love".to_string(),
                    members: 1850,
                    who: "Readers".to_string(),
                },
                events: vec![Event {
                    id: "228340981".to_string(),
                    name: "SIGMOD Retrospective".to_string(),
                    status: "past".to_string(),
                    yes_rsvp_count: 41,
                }],
                boards: Vec::new(),
                discussions: Vec::new(),
                members: Vec::new(),
                venues: Vec::new(),
            },
        );

        Self {
            categories: vec![
                Category {
                    id: 1,
                    name: "Arts & Culture".to_string(),
                    shortname: "arts".to_string(),
                },
                Category {
                    id: 6,
                    name: "Education & Learning".to_string(),
                    shortname: "education".to_string(),
                },
                Category {
                    id: 34,
                    name: "Tech".to_string(),
                    shortname: "tech".to_string(),
                },
            ],
            cities: vec![
                City {
                    id: 10001,
                    city: "New York".to_string(),
                    country: "us".to_string(),
                    member_count: 81000,
                },
                City {
                    id: 94101,
                    city: "San Francisco".to_string(),
                    country: "us".to_string(),
                    member_count: 45000,
                },
            ],
            groups,
            rsvps: Vec::new(),
        }
    }
}

pub type Db = Arc<RwLock<Directory>>;

/// Query-key gate. The real API answers 401 for a missing or empty key;
/// any non-empty key passes here.
pub struct ApiKey(pub String);

impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        let params: HashMap<String, String> = serde_urlencoded::from_str(query).unwrap_or_default();
        match params.get("key") {
            Some(key) if !key.is_empty() => Ok(ApiKey(key.clone())),
            _ => Err((StatusCode::UNAUTHORIZED, Json(ApiErrorBody::auth_fail()))),
        }
    }
}

/// RSVP posts carry their fields (key included) form-encoded in the body.
#[derive(Debug, Deserialize)]
pub struct RsvpForm {
    #[serde(default)]
    pub key: String,
    pub event_id: String,
    pub rsvp: String,
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Directory::seeded()));
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/2/categories", get(categories))
        .route("/2/cities", get(cities))
        .route("/2/rsvp", post(create_rsvp))
        .route("/find/groups", get(find_groups))
        .route("/{urlname}", get(group))
        .route("/{urlname}/events", get(group_events))
        .route("/{urlname}/events/{event_id}", get(group_event))
        .route("/{urlname}/events/{event_id}/rsvps", get(event_rsvps))
        .route("/{urlname}/boards", get(group_boards))
        .route("/{urlname}/boards/{board_id}/discussions", get(board_discussions))
        .route("/{urlname}/members", get(group_members))
        .route("/{urlname}/venues", get(group_venues))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn dashboard(_key: ApiKey, State(db): State<Db>) -> Json<serde_json::Value> {
    let dir = db.read().await;
    let upcoming = dir
        .groups
        .values()
        .flat_map(|record| &record.events)
        .filter(|event| event.status == "upcoming")
        .count();
    Json(serde_json::json!({
        "group_count": dir.groups.len(),
        "upcoming_events": upcoming,
        "rsvp_count": dir.rsvps.len(),
    }))
}

async fn categories(_key: ApiKey, State(db): State<Db>) -> Json<Vec<Category>> {
    Json(db.read().await.categories.clone())
}

async fn cities(_key: ApiKey, State(db): State<Db>) -> Json<Vec<City>> {
    Json(db.read().await.cities.clone())
}

async fn find_groups(_key: ApiKey, State(db): State<Db>) -> Json<Vec<Group>> {
    let dir = db.read().await;
    let mut groups: Vec<Group> = dir.groups.values().map(|r| r.group.clone()).collect();
    groups.sort_by(|a, b| a.urlname.cmp(&b.urlname));
    Json(groups)
}

async fn group(
    _key: ApiKey,
    State(db): State<Db>,
    Path(urlname): Path<String>,
) -> Result<Json<Group>, ErrorResponse> {
    let dir = db.read().await;
    dir.groups
        .get(&urlname)
        .map(|record| Json(record.group.clone()))
        .ok_or_else(|| not_found("group not found"))
}

async fn group_events(
    _key: ApiKey,
    State(db): State<Db>,
    Path(urlname): Path<String>,
) -> Result<Json<Vec<Event>>, ErrorResponse> {
    let dir = db.read().await;
    dir.groups
        .get(&urlname)
        .map(|record| Json(record.events.clone()))
        .ok_or_else(|| not_found("group not found"))
}

async fn group_event(
    _key: ApiKey,
    State(db): State<Db>,
    Path((urlname, event_id)): Path<(String, String)>,
) -> Result<Json<Event>, ErrorResponse> {
    let dir = db.read().await;
    let record = dir
        .groups
        .get(&urlname)
        .ok_or_else(|| not_found("group not found"))?;
    record
        .events
        .iter()
        .find(|event| event.id == event_id)
        .map(|event| Json(event.clone()))
        .ok_or_else(|| not_found("event not found"))
}

async fn event_rsvps(
    _key: ApiKey,
    State(db): State<Db>,
    Path((urlname, event_id)): Path<(String, String)>,
) -> Result<Json<Vec<Rsvp>>, ErrorResponse> {
    let dir = db.read().await;
    let record = dir
        .groups
        .get(&urlname)
        .ok_or_else(|| not_found("group not found"))?;
    if !record.events.iter().any(|event| event.id == event_id) {
        return Err(not_found("event not found"));
    }
    let rsvps = dir
        .rsvps
        .iter()
        .filter(|rsvp| rsvp.event_id == event_id)
        .cloned()
        .collect();
    Ok(Json(rsvps))
}

async fn group_boards(
    _key: ApiKey,
    State(db): State<Db>,
    Path(urlname): Path<String>,
) -> Result<Json<Vec<Board>>, ErrorResponse> {
    let dir = db.read().await;
    dir.groups
        .get(&urlname)
        .map(|record| Json(record.boards.clone()))
        .ok_or_else(|| not_found("group not found"))
}

async fn board_discussions(
    _key: ApiKey,
    State(db): State<Db>,
    Path((urlname, board_id)): Path<(String, u64)>,
) -> Result<Json<Vec<Discussion>>, ErrorResponse> {
    let dir = db.read().await;
    let record = dir
        .groups
        .get(&urlname)
        .ok_or_else(|| not_found("group not found"))?;
    if !record.boards.iter().any(|board| board.id == board_id) {
        return Err(not_found("board not found"));
    }
    let discussions = record
        .discussions
        .iter()
        .filter(|discussion| discussion.board_id == board_id)
        .cloned()
        .collect();
    Ok(Json(discussions))
}

async fn group_members(
    _key: ApiKey,
    State(db): State<Db>,
    Path(urlname): Path<String>,
) -> Result<Json<Vec<Member>>, ErrorResponse> {
    let dir = db.read().await;
    dir.groups
        .get(&urlname)
        .map(|record| Json(record.members.clone()))
        .ok_or_else(|| not_found("group not found"))
}

async fn group_venues(
    _key: ApiKey,
    State(db): State<Db>,
    Path(urlname): Path<String>,
) -> Result<Json<Vec<Venue>>, ErrorResponse> {
    let dir = db.read().await;
    dir.groups
        .get(&urlname)
        .map(|record| Json(record.venues.clone()))
        .ok_or_else(|| not_found("group not found"))
}

async fn create_rsvp(
    State(db): State<Db>,
    Form(input): Form<RsvpForm>,
) -> Result<(StatusCode, Json<Rsvp>), ErrorResponse> {
    if input.key.is_empty() {
        return Err((StatusCode::UNAUTHORIZED, Json(ApiErrorBody::auth_fail())));
    }
    let mut dir = db.write().await;
    let known = dir
        .groups
        .values()
        .any(|record| record.events.iter().any(|event| event.id == input.event_id));
    if !known {
        return Err(not_found("event not found"));
    }
    let rsvp = Rsvp {
        id: Uuid::new_v4(),
        event_id: input.event_id,
        response: input.rsvp,
    };
    dir.rsvps.push(rsvp.clone());
    Ok((StatusCode::CREATED, Json(rsvp)))
}
