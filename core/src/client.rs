//! Meetup API client: fixed base URI, key injection, and the endpoint
//! table.
//!
//! # Design
//! `MeetupClient` wraps the shared `Requester` pipeline. Each endpoint
//! method composes a resource path, wraps the optional `fields` selector,
//! and runs the request — one line per route. The API key is folded into
//! the outgoing params on every call, overriding any caller-supplied `key`
//! entry; Meetup authenticates through that parameter, not headers, so the
//! default header strategy stays empty.

use serde_json::Value;

use crate::error::ApiError;
use crate::http::{Method, Params, Transport};
use crate::request::{HeaderStrategy, Requester};

/// HTTPS root of the Meetup REST API.
pub const BASE_URI: &str = "https://api.meetup.com";

/// Answer carried by an RSVP post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpResponse {
    Yes,
    No,
}

impl RsvpResponse {
    fn as_str(self) -> &'static str {
        match self {
            RsvpResponse::Yes => "yes",
            RsvpResponse::No => "no",
        }
    }
}

/// Synchronous client for the Meetup REST API.
///
/// One blocking round trip per endpoint call, no retries, no caching. The
/// transport is injected at construction; the base URI is fixed to the
/// production root unless built through `with_base_uri`.
#[derive(Debug)]
pub struct MeetupClient {
    requester: Requester,
    api_key: String,
}

impl MeetupClient {
    /// Client against the production API root. Debug mode starts off.
    pub fn new(api_key: &str, transport: Box<dyn Transport>) -> Self {
        Self::with_base_uri(BASE_URI, api_key, transport)
    }

    /// Client against an alternate root, e.g. a local mock server.
    pub fn with_base_uri(base_uri: &str, api_key: &str, transport: Box<dyn Transport>) -> Self {
        Self {
            requester: Requester::new(base_uri, transport),
            api_key: api_key.to_string(),
        }
    }

    /// Return non-2xx bodies decoded instead of wrapped in an error.
    pub fn debug(mut self, debug: bool) -> Self {
        self.requester = self.requester.debug(debug);
        self
    }

    /// Replace the header strategy invoked before every request.
    pub fn header_strategy(mut self, strategy: HeaderStrategy) -> Self {
        self.requester = self.requester.header_strategy(strategy);
        self
    }

    /// Inject the key and run one request through build + fetch.
    fn run(&self, route: &str, mut params: Params, method: Method) -> Result<Value, ApiError> {
        params.insert("key".to_string(), Value::String(self.api_key.clone()));
        let request = self.requester.build(route, params, method)?;
        self.requester.fetch(request)
    }

    fn get(&self, route: &str, fields: Option<&str>) -> Result<Value, ApiError> {
        self.run(route, fields_params(fields), Method::Get)
    }

    /// Aggregated Meetup information for the authorized member.
    pub fn dashboard(&self, fields: Option<&str>) -> Result<Value, ApiError> {
        self.get("dashboard", fields)
    }

    /// All event categories.
    pub fn categories(&self, fields: Option<&str>) -> Result<Value, ApiError> {
        self.get("2/categories", fields)
    }

    /// Cities known to Meetup.
    pub fn cities(&self, fields: Option<&str>) -> Result<Value, ApiError> {
        self.get("2/cities", fields)
    }

    /// Search for groups.
    pub fn find_groups(&self, fields: Option<&str>) -> Result<Value, ApiError> {
        self.get("find/groups", fields)
    }

    /// A single group by its URL name.
    pub fn group(&self, urlname: &str, fields: Option<&str>) -> Result<Value, ApiError> {
        self.get(urlname, fields)
    }

    /// Events of a group.
    pub fn group_events(&self, urlname: &str, fields: Option<&str>) -> Result<Value, ApiError> {
        self.get(&format!("{urlname}/events"), fields)
    }

    /// One event of a group by event id.
    pub fn group_event(
        &self,
        urlname: &str,
        event_id: &str,
        fields: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.get(&format!("{urlname}/events/{event_id}"), fields)
    }

    /// RSVPs of a single event.
    pub fn event_rsvps(
        &self,
        urlname: &str,
        event_id: &str,
        fields: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.get(&format!("{urlname}/events/{event_id}/rsvps"), fields)
    }

    /// Discussion boards of a group.
    pub fn group_boards(&self, urlname: &str, fields: Option<&str>) -> Result<Value, ApiError> {
        self.get(&format!("{urlname}/boards"), fields)
    }

    /// Discussions of one board.
    pub fn board_discussions(
        &self,
        urlname: &str,
        board_id: u64,
        fields: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.get(&format!("{urlname}/boards/{board_id}/discussions"), fields)
    }

    /// Members of a group.
    pub fn group_members(&self, urlname: &str, fields: Option<&str>) -> Result<Value, ApiError> {
        self.get(&format!("{urlname}/members"), fields)
    }

    /// Venues a group has used.
    pub fn group_venues(&self, urlname: &str, fields: Option<&str>) -> Result<Value, ApiError> {
        self.get(&format!("{urlname}/venues"), fields)
    }

    /// RSVP to an event on behalf of the authorized member. The params ride
    /// in the request body (form-encoded by the transport), key included.
    pub fn post_rsvp(&self, event_id: &str, response: RsvpResponse) -> Result<Value, ApiError> {
        let mut params = Params::new();
        params.insert("event_id".to_string(), Value::String(event_id.to_string()));
        params.insert("rsvp".to_string(), Value::String(response.as_str().to_string()));
        self.run("2/rsvp", params, Method::Post)
    }
}

/// Wrap the optional `fields` selector the way every read endpoint expects.
/// A `None` selector stays in the mapping as null and is filtered out of
/// the query string at build time.
fn fields_params(fields: Option<&str>) -> Params {
    let mut params = Params::new();
    params.insert(
        "fields".to_string(),
        fields.map_or(Value::Null, |f| Value::String(f.to_string())),
    );
    params
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::http::{Body, PendingRequest, RawResponse};

    /// Transport spy: records executed requests, answers with canned data.
    struct CannedTransport {
        status: u16,
        body: String,
        log: Arc<Mutex<Vec<(String, PendingRequest)>>>,
    }

    impl Transport for CannedTransport {
        fn execute(&self, url: &str, request: &PendingRequest) -> Result<RawResponse, ApiError> {
            self.log
                .lock()
                .unwrap()
                .push((url.to_string(), request.clone()));
            Ok(RawResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn client_with(
        key: &str,
        status: u16,
        body: &str,
    ) -> (MeetupClient, Arc<Mutex<Vec<(String, PendingRequest)>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let transport = CannedTransport {
            status,
            body: body.to_string(),
            log: Arc::clone(&log),
        };
        (MeetupClient::new(key, Box::new(transport)), log)
    }

    #[test]
    fn categories_without_fields_sends_only_the_key() {
        let (client, log) = client_with("ABC123", 200, r#"[{"id":1,"shortname":"tech"}]"#);
        let value = client.categories(None).unwrap();

        let seen = log.lock().unwrap();
        let (url, request) = &seen[0];
        assert_eq!(url, "https://api.meetup.com/2/categories?key=ABC123");
        assert_eq!(request.method, Method::Get);
        assert!(request.body.is_none());
        assert!(request.headers.is_empty());
        assert_eq!(value, json!([{"id": 1, "shortname": "tech"}]));
    }

    #[test]
    fn fields_selector_joins_the_query() {
        let (client, log) = client_with("ABC123", 200, "[]");
        client.categories(Some("id,name")).unwrap();

        let seen = log.lock().unwrap();
        assert_eq!(
            seen[0].0,
            "https://api.meetup.com/2/categories?fields=id%2Cname&key=ABC123"
        );
    }

    #[test]
    fn path_parameters_interpolate_into_the_route() {
        let (client, log) = client_with("K", 200, "{}");
        client.group_event("rust-nyc", "236512345", None).unwrap();
        client.board_discussions("rust-nyc", 7, None).unwrap();

        let seen = log.lock().unwrap();
        assert_eq!(
            seen[0].0,
            "https://api.meetup.com/rust-nyc/events/236512345?key=K"
        );
        assert_eq!(
            seen[1].0,
            "https://api.meetup.com/rust-nyc/boards/7/discussions?key=K"
        );
    }

    #[test]
    fn injected_key_overrides_a_caller_supplied_key() {
        let (client, log) = client_with("REAL", 200, "{}");
        let mut params = Params::new();
        params.insert("key".to_string(), json!("FORGED"));
        client.run("dashboard", params, Method::Get).unwrap();

        let seen = log.lock().unwrap();
        assert_eq!(seen[0].0, "https://api.meetup.com/dashboard?key=REAL");
    }

    #[test]
    fn post_rsvp_carries_key_and_fields_in_the_body() {
        let (client, log) = client_with("K", 201, "{}");
        client.post_rsvp("236512345", RsvpResponse::Yes).unwrap();

        let seen = log.lock().unwrap();
        let (url, request) = &seen[0];
        assert_eq!(url, "https://api.meetup.com/2/rsvp");
        assert_eq!(request.method, Method::Post);
        match &request.body {
            Some(Body::Fields(params)) => {
                assert_eq!(params.get("event_id"), Some(&json!("236512345")));
                assert_eq!(params.get("rsvp"), Some(&json!("yes")));
                assert_eq!(params.get("key"), Some(&json!("K")));
            }
            other => panic!("expected a fields body, got {other:?}"),
        }
    }

    #[test]
    fn spy_header_strategy_sees_its_headers_sent() {
        let (client, log) = client_with("K", 200, "{}");
        let client = client.header_strategy(Box::new(|| {
            vec![("X-Spy".to_string(), "on".to_string())]
        }));
        client.dashboard(None).unwrap();

        let seen = log.lock().unwrap();
        assert_eq!(
            seen[0].1.headers,
            vec![("X-Spy".to_string(), "on".to_string())]
        );
    }

    #[test]
    fn failure_status_wraps_when_debug_is_off() {
        let (client, _) = client_with("K", 500, r#"{"error":"boom"}"#);
        let err = client.dashboard(None).unwrap_err();
        match err {
            ApiError::ResponseError { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, json!({"error": "boom"}));
            }
            other => panic!("expected ResponseError, got {other:?}"),
        }
    }

    #[test]
    fn failure_status_passes_through_when_debug_is_on() {
        let (client, _) = client_with("K", 500, r#"{"error":"boom"}"#);
        let client = client.debug(true);
        assert_eq!(client.dashboard(None).unwrap(), json!({"error": "boom"}));
    }

    #[test]
    fn success_status_is_never_wrapped() {
        let (client, _) = client_with("K", 200, r#"{"ok":true}"#);
        assert_eq!(client.dashboard(None).unwrap(), json!({"ok": true}));

        let (client, _) = client_with("K", 200, r#"{"ok":true}"#);
        let client = client.debug(true);
        assert_eq!(client.dashboard(None).unwrap(), json!({"ok": true}));
    }
}
