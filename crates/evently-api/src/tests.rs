//! Router-level tests driving the API against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use evently_core::{
  rsvp::RsvpStatus,
  store::EventStore,
  user::{NewUser, User},
};
use evently_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{api_router, auth::hash_password};

const PASSWORD: &str = "pass1234";

async fn make_store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.unwrap())
}

async fn add_user(store: &SqliteStore, username: &str) -> User {
  store
    .create_user(NewUser {
      username:      username.into(),
      email:         format!("{username}@example.com"),
      password_hash: hash_password(PASSWORD).unwrap(),
      ..Default::default()
    })
    .await
    .unwrap()
}

fn basic(user: &str, pass: &str) -> String {
  format!("Basic {}", B64.encode(format!("{user}:{pass}")))
}

/// Send one request; `as_user` authenticates with the shared test password.
async fn send(
  store:   &Arc<SqliteStore>,
  method:  &str,
  uri:     &str,
  as_user: Option<&str>,
  body:    Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(user) = as_user {
    builder = builder.header(header::AUTHORIZATION, basic(user, PASSWORD));
  }
  let req = match body {
    Some(json) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(json.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = api_router(store.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

fn event_body(title: &str, is_public: bool) -> Value {
  json!({
    "title": title,
    "description": "A great event for tech enthusiasts",
    "location": "Mumbai",
    "start_time": "2025-11-10T09:00:00Z",
    "end_time": "2025-11-10T17:00:00Z",
    "is_public": is_public,
  })
}

async fn create_event(store: &Arc<SqliteStore>, as_user: &str, is_public: bool) -> i64 {
  let (status, json) = send(
    store,
    "POST",
    "/events/",
    Some(as_user),
    Some(event_body("Tech Conference", is_public)),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{json}");
  json["id"].as_i64().unwrap()
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_event_forces_organizer_to_caller() {
  let store = make_store().await;
  add_user(&store, "user1").await;
  add_user(&store, "user2").await;

  let mut body = event_body("Hackathon 2025", true);
  body["organizer"] = json!("user2");
  let (status, json) = send(&store, "POST", "/events/", Some("user1"), Some(body)).await;

  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(json["title"], "Hackathon 2025");
  assert_eq!(json["organizer"], "user1");
  assert_eq!(json["invited"], json!([]));
  assert!(json["created_at"].is_string());
}

#[tokio::test]
async fn unauthenticated_create_returns_401() {
  let store = make_store().await;
  let req = Request::builder()
    .method("POST")
    .uri("/events/")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(event_body("Public Hack", true).to_string()))
    .unwrap();

  let resp = api_router(store.clone()).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn wrong_password_returns_401() {
  let store = make_store().await;
  add_user(&store, "user1").await;
  let id = create_event(&store, "user1", true).await;

  // Optional-auth endpoints still reject bad credentials.
  for uri in [format!("/events/{id}/"), "/events/".to_owned(), format!("/events/{id}/reviews/")] {
    let req = Request::builder()
      .uri(&uri)
      .header(header::AUTHORIZATION, basic("user1", "wrong"))
      .body(Body::empty())
      .unwrap();
    let resp = api_router(store.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
  }
}

#[tokio::test]
async fn invalid_event_fields_return_400() {
  let store = make_store().await;
  add_user(&store, "user1").await;

  let mut body = event_body("", true);
  let (status, json) =
    send(&store, "POST", "/events/", Some("user1"), Some(body.clone())).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["field"], "title");

  body["title"] = json!("Fine");
  body["invited"] = json!([999]);
  let (status, json) = send(&store, "POST", "/events/", Some("user1"), Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["field"], "invited");

  let (status, _) = send(
    &store,
    "POST",
    "/events/",
    Some("user1"),
    Some(json!({ "title": "Missing everything else" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_never_includes_private_events() {
  let store = make_store().await;
  add_user(&store, "user1").await;
  let public = create_event(&store, "user1", true).await;
  create_event(&store, "user1", false).await;
  let later = create_event(&store, "user1", true).await;

  for caller in [None, Some("user1")] {
    let (status, json) = send(&store, "GET", "/events/", caller, None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = json
      .as_array()
      .unwrap()
      .iter()
      .map(|e| e["id"].as_i64().unwrap())
      .collect();
    assert_eq!(ids, vec![public, later]);
  }
}

#[tokio::test]
async fn public_event_readable_anonymously() {
  let store = make_store().await;
  add_user(&store, "user1").await;
  let id = create_event(&store, "user1", true).await;

  let (status, json) = send(&store, "GET", &format!("/events/{id}/"), None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["title"], "Tech Conference");
}

#[tokio::test]
async fn unknown_event_returns_404() {
  let store = make_store().await;
  let (status, _) = send(&store, "GET", "/events/77/", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn writes_to_unknown_event_return_404() {
  let store = make_store().await;
  add_user(&store, "user1").await;

  let cases = [
    ("PUT", "/events/77/", Some(event_body("Ghost", true))),
    ("PATCH", "/events/77/", Some(json!({ "title": "Ghost" }))),
    ("DELETE", "/events/77/", None),
    ("POST", "/events/77/reviews/", Some(json!({ "rating": 4 }))),
    ("POST", "/events/77/rsvp/", Some(json!({ "status": "Going" }))),
  ];
  for (method, uri, body) in cases {
    let (status, _) = send(&store, method, uri, Some("user1"), body).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
  }
}

#[tokio::test]
async fn non_numeric_ids_return_404() {
  let store = make_store().await;
  let uris = ["/events/abc/", "/events/99999999999999999999/", "/events/x/reviews/", "/users/x/"];
  for uri in uris {
    let (status, json) = send(&store, "GET", uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    assert!(json["error"].is_string());
  }
}

#[tokio::test]
async fn private_event_visibility_follows_invitations() {
  let store = make_store().await;
  add_user(&store, "user1").await;
  let user2 = add_user(&store, "user2").await;
  let id = create_event(&store, "user1", true).await;
  let uri = format!("/events/{id}/");

  let (status, _) = send(&store, "GET", &uri, Some("user2"), None).await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) =
    send(&store, "PATCH", &uri, Some("user1"), Some(json!({ "is_public": false }))).await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(&store, "GET", &uri, Some("user2"), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = send(&store, "GET", &uri, None, None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, json) =
    send(&store, "PATCH", &uri, Some("user1"), Some(json!({ "invited": [user2.id] }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["invited"], json!([user2.id]));

  let (status, _) = send(&store, "GET", &uri, Some("user2"), None).await;
  assert_eq!(status, StatusCode::OK);
  let (status, _) = send(&store, "GET", &uri, None, None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn organizer_can_replace_event() {
  let store = make_store().await;
  add_user(&store, "user1").await;
  let id = create_event(&store, "user1", true).await;

  let body = event_body("Updated Tech Conference", true);
  let (status, json) =
    send(&store, "PUT", &format!("/events/{id}/"), Some("user1"), Some(body)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["title"], "Updated Tech Conference");
  assert_eq!(json["organizer"], "user1");

  let event = store.get_event(id).await.unwrap().unwrap();
  assert_eq!(event.title, "Updated Tech Conference");
}

#[tokio::test]
async fn only_organizer_may_write() {
  let store = make_store().await;
  add_user(&store, "user1").await;
  let user2 = add_user(&store, "user2").await;
  let id = create_event(&store, "user1", false).await;
  let uri = format!("/events/{id}/");

  send(&store, "PATCH", &uri, Some("user1"), Some(json!({ "invited": [user2.id] }))).await;

  // An invitee can read but not write.
  let (status, _) = send(&store, "GET", &uri, Some("user2"), None).await;
  assert_eq!(status, StatusCode::OK);
  let (status, _) = send(
    &store,
    "PUT",
    &uri,
    Some("user2"),
    Some(event_body("Hacked Event", false)),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = send(&store, "DELETE", &uri, Some("user2"), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(&store, "DELETE", &uri, None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let event = store.get_event(id).await.unwrap().unwrap();
  assert_eq!(event.title, "Tech Conference");
}

#[tokio::test]
async fn update_rejects_end_before_start() {
  let store = make_store().await;
  add_user(&store, "user1").await;
  let id = create_event(&store, "user1", true).await;

  let (status, json) = send(
    &store,
    "PATCH",
    &format!("/events/{id}/"),
    Some("user1"),
    Some(json!({ "end_time": "2025-11-09T09:00:00Z" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["field"], "end_time");
}

#[tokio::test]
async fn delete_cascades_to_rsvps_and_reviews() {
  let store = make_store().await;
  add_user(&store, "user1").await;
  add_user(&store, "user2").await;
  let id = create_event(&store, "user1", true).await;

  let rsvp = format!("/events/{id}/rsvp/");
  let reviews = format!("/events/{id}/reviews/");
  send(&store, "POST", &rsvp, Some("user2"), Some(json!({ "status": "Going" }))).await;
  send(&store, "POST", &reviews, Some("user2"), Some(json!({ "rating": 4 }))).await;

  let (status, json) =
    send(&store, "DELETE", &format!("/events/{id}/"), Some("user1"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  assert_eq!(json, Value::Null);

  let (status, _) = send(&store, "GET", &format!("/events/{id}/"), Some("user1"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(store.list_rsvps(id).await.unwrap().is_empty());
  assert!(store.list_reviews(id).await.unwrap().is_empty());
}

// ─── RSVPs ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rsvp_second_submission_updates_in_place() {
  let store = make_store().await;
  add_user(&store, "user1").await;
  let id = create_event(&store, "user1", false).await;
  let uri = format!("/events/{id}/rsvp/");

  let (status, json) =
    send(&store, "POST", &uri, Some("user1"), Some(json!({ "status": "Maybe" }))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(json["status"], "Maybe");
  assert_eq!(json["user"], "user1");
  assert_eq!(json["event"], id);

  let (status, json) =
    send(&store, "POST", &uri, Some("user1"), Some(json!({ "status": "Going" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["status"], "Going");

  let rows = store.list_rsvps(id).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].status, RsvpStatus::Going);
}

#[tokio::test]
async fn rsvp_ignores_client_supplied_identity() {
  let store = make_store().await;
  add_user(&store, "user1").await;
  let user2 = add_user(&store, "user2").await;
  let id = create_event(&store, "user1", true).await;
  let other = create_event(&store, "user1", true).await;

  let (status, json) = send(
    &store,
    "POST",
    &format!("/events/{id}/rsvp/"),
    Some("user1"),
    Some(json!({ "status": "Not Going", "user": user2.id, "event": other })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(json["user"], "user1");
  assert_eq!(json["event"], id);
  assert!(store.list_rsvps(other).await.unwrap().is_empty());
}

#[tokio::test]
async fn rsvp_rejects_unknown_status() {
  let store = make_store().await;
  add_user(&store, "user1").await;
  let id = create_event(&store, "user1", true).await;
  let uri = format!("/events/{id}/rsvp/");

  for body in [json!({ "status": "Attending" }), json!({}), json!({ "status": 3 })] {
    let (status, json) = send(&store, "POST", &uri, Some("user1"), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["field"], "status");
    assert_eq!(json["error"], "Status must be 'Going', 'Maybe', or 'Not Going'.");
  }
  assert!(store.list_rsvps(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn rsvp_requires_auth_and_existing_event() {
  let store = make_store().await;
  add_user(&store, "user1").await;

  let (status, _) =
    send(&store, "POST", "/events/5/rsvp/", None, Some(json!({ "status": "Going" }))).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, _) =
    send(&store, "POST", "/events/5/rsvp/", Some("user1"), Some(json!({ "status": "Going" }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Reviews ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_list_reviews() {
  let store = make_store().await;
  add_user(&store, "user1").await;
  add_user(&store, "user2").await;
  let id = create_event(&store, "user1", true).await;
  let uri = format!("/events/{id}/reviews/");

  let (status, json) = send(
    &store,
    "POST",
    &uri,
    Some("user1"),
    Some(json!({ "rating": 5, "comment": "Fantastic event!", "user": "user2" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(json["rating"], 5);
  assert_eq!(json["user"], "user1");
  assert_eq!(json["event"], id);

  send(&store, "POST", &uri, Some("user2"), Some(json!({ "rating": 3 }))).await;

  let (status, json) = send(&store, "GET", &uri, None, None).await;
  assert_eq!(status, StatusCode::OK);
  let reviews = json.as_array().unwrap();
  assert_eq!(reviews.len(), 2);
  assert_eq!(reviews[0]["user"], "user1");
  assert_eq!(reviews[1]["user"], "user2");
  assert_eq!(reviews[1]["comment"], "");
}

#[tokio::test]
async fn review_validation_and_uniqueness() {
  let store = make_store().await;
  add_user(&store, "user1").await;
  let id = create_event(&store, "user1", true).await;
  let uri = format!("/events/{id}/reviews/");

  for rating in [0, 6] {
    let (status, json) =
      send(&store, "POST", &uri, Some("user1"), Some(json!({ "rating": rating }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["field"], "rating");
  }

  let (status, _) =
    send(&store, "POST", &uri, Some("user1"), Some(json!({ "rating": 4 }))).await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, json) =
    send(&store, "POST", &uri, Some("user1"), Some(json!({ "rating": 2 }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["field"], "non_field_errors");

  let (status, _) = send(&store, "POST", &uri, None, Some(json!({ "rating": 4 }))).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reviews_for_unknown_event_return_404() {
  let store = make_store().await;
  let (status, _) = send(&store, "GET", "/events/3/reviews/", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_then_authenticate() {
  let store = make_store().await;

  let (status, json) = send(
    &store,
    "POST",
    "/users/",
    None,
    Some(json!({ "username": "newbie", "password": PASSWORD, "full_name": "New Bie" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(json["username"], "newbie");
  assert_eq!(json["full_name"], "New Bie");
  assert!(json.get("password").is_none());
  assert!(json.get("password_hash").is_none());

  let (status, json) = send(&store, "GET", "/users/me/", Some("newbie"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["username"], "newbie");
}

#[tokio::test]
async fn duplicate_username_returns_400() {
  let store = make_store().await;
  add_user(&store, "user1").await;

  let (status, json) = send(
    &store,
    "POST",
    "/users/",
    None,
    Some(json!({ "username": "user1", "password": "other" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["field"], "username");
}

#[tokio::test]
async fn username_is_trimmed_and_charset_checked() {
  let store = make_store().await;

  let (status, json) = send(
    &store,
    "POST",
    "/users/",
    None,
    Some(json!({ "username": "  alice ", "password": PASSWORD })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(json["username"], "alice");

  let (status, json) = send(&store, "GET", "/users/me/", Some("alice"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["username"], "alice");

  for username in ["a:b", "two words"] {
    let (status, json) = send(
      &store,
      "POST",
      "/users/",
      None,
      Some(json!({ "username": username, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{username}");
    assert_eq!(json["field"], "username");
  }
}

#[tokio::test]
async fn blank_password_rejected() {
  let store = make_store().await;
  let (status, json) = send(
    &store,
    "POST",
    "/users/",
    None,
    Some(json!({ "username": "someone", "password": "" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["field"], "password");
}

#[tokio::test]
async fn owner_edits_profile() {
  let store = make_store().await;
  let user1 = add_user(&store, "user1").await;

  let (status, json) = send(
    &store,
    "PATCH",
    "/users/me/",
    Some("user1"),
    Some(json!({ "bio": "Organizer of things", "location": "Pune", "username": "renamed" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["bio"], "Organizer of things");
  assert_eq!(json["username"], "user1");

  let (status, json) = send(&store, "GET", &format!("/users/{}/", user1.id), None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["location"], "Pune");

  let (status, _) = send(&store, "GET", "/users/me/", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, _) = send(&store, "GET", "/users/999/", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_returns_400() {
  let store = make_store().await;
  add_user(&store, "user1").await;

  let req = Request::builder()
    .method("POST")
    .uri("/events/")
    .header(header::AUTHORIZATION, basic("user1", PASSWORD))
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let resp = api_router(store.clone()).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
