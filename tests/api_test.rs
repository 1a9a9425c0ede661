use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use tripboard::config::Config;
use tripboard::db;
use tripboard::routes;
use tripboard::state::AppState;

struct TestApp {
    base: String,
    _dir: TempDir,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

async fn spawn_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.database.path = Some(dir.path().join("api.db"));
    config.auth.bcrypt_cost = 4;

    let pool = db::create_pool(config.db_path()).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");
    let app = routes::app(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base: format!("http://{}", addr),
        _dir: dir,
    }
}

fn client() -> Client {
    Client::builder().cookie_store(true).build().unwrap()
}

/// Registers `email` on `client`, leaving it signed in.
async fn sign_up(app: &TestApp, client: &Client, email: &str) -> Value {
    let res = client
        .post(app.url("/auth/register"))
        .json(&json!({ "email": email, "password": "hunter22", "name": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn create_trip(app: &TestApp, client: &Client, body: Value) -> Value {
    let res = client
        .post(app.url("/trips"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn post_json(client: &Client, url: String, body: Value) -> (StatusCode, Value) {
    let res = client.post(url).json(&body).send().await.unwrap();
    let status = res.status();
    let body = res.json().await.unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_reports_trip_count() {
    let app = spawn_app().await;
    let body: Value = client()
        .get(app.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "status": "ok", "trips": 0 }));
}

#[tokio::test]
async fn register_login_me_logout() {
    let app = spawn_app().await;
    let alice = client();

    let user = sign_up(&app, &alice, "alice@example.com").await;
    assert_eq!(user["email"], "alice@example.com");
    assert!(user.get("passwordHash").is_none());

    let me: Value = alice
        .get(app.url("/auth/me"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["id"], user["id"]);

    let dup = client()
        .post(app.url("/auth/register"))
        .json(&json!({ "email": "alice@example.com", "password": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(dup.status(), StatusCode::CONFLICT);

    let missing = client()
        .post(app.url("/auth/register"))
        .json(&json!({ "email": "bob@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let logout = alice.post(app.url("/auth/logout")).send().await.unwrap();
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);
    let after = alice.get(app.url("/auth/me")).send().await.unwrap();
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);

    let wrong = alice
        .post(app.url("/auth/login"))
        .json(&json!({ "email": "alice@example.com", "password": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let body: Value = wrong.json().await.unwrap();
    assert_eq!(body["error"], "invalid credentials");

    let ok = alice
        .post(app.url("/auth/login"))
        .json(&json!({ "email": "alice@example.com", "password": "hunter22" }))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let me = alice.get(app.url("/auth/me")).send().await.unwrap();
    assert_eq!(me.status(), StatusCode::OK);
}

#[tokio::test]
async fn bearer_tokens_are_accepted() {
    let app = spawn_app().await;
    let res = Client::new()
        .post(app.url("/auth/register"))
        .json(&json!({ "email": "carol@example.com", "password": "pw" }))
        .send()
        .await
        .unwrap();
    let cookie = res
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.contains("HttpOnly"));
    let token = cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("jp_token="))
        .unwrap();

    let me = Client::new()
        .get(app.url("/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::OK);
}

#[tokio::test]
async fn trip_creation_fills_days_and_validates() {
    let app = spawn_app().await;
    let owner = client();
    sign_up(&app, &owner, "owner@example.com").await;

    let trip = create_trip(
        &app,
        &owner,
        json!({ "name": "Tokyo", "startDate": "2026-03-16", "endDate": "2026-03-18T00:00:00Z" }),
    )
    .await;
    let days = trip["days"].as_array().unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(days[0]["date"], "2026-03-16");
    assert_eq!(trip["memberships"][0]["role"], "owner");

    let (status, body) = post_json(&owner, app.url("/trips"), json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name is required");

    let (status, body) = post_json(
        &owner,
        app.url(&format!("/trips/{}/days", trip["id"])),
        json!({ "date": "2026-03-17" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "a day for 2026-03-17 already exists");

    let (status, body) = post_json(
        &owner,
        app.url(&format!("/trips/{}/days", trip["id"])),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "date is required (ISO string)");

    let mine: Value = owner
        .get(app.url("/trips"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn viewers_cannot_change_anything() {
    let app = spawn_app().await;
    let owner = client();
    let viewer = client();
    let stranger = client();
    sign_up(&app, &owner, "owner@example.com").await;
    sign_up(&app, &viewer, "viewer@example.com").await;
    sign_up(&app, &stranger, "stranger@example.com").await;

    let trip = create_trip(
        &app,
        &owner,
        json!({ "name": "Kyoto", "startDate": "2026-04-01", "endDate": "2026-04-01" }),
    )
    .await;
    let trip_id = trip["id"].as_i64().unwrap();
    let day_id = trip["days"][0]["id"].as_i64().unwrap();
    let trip_url = app.url(&format!("/trips/{trip_id}"));

    let (status, member) = post_json(
        &owner,
        format!("{trip_url}/memberships"),
        json!({ "email": "viewer@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["role"], "viewer");

    let (_, kyoto) = post_json(
        &owner,
        format!("{trip_url}/cities"),
        json!({ "name": "Kyoto", "timeZone": "Asia/Tokyo" }),
    )
    .await;
    let mut activity_ids = Vec::new();
    for title in ["Temple", "Market"] {
        let (status, activity) = post_json(
            &owner,
            app.url(&format!("/days/{day_id}/activities")),
            json!({ "title": title, "cityId": kyoto["id"] }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        activity_ids.push(activity["id"].as_i64().unwrap());
    }
    let (_, idea) = post_json(
        &owner,
        format!("{trip_url}/ideas"),
        json!({ "title": "Tea ceremony", "cityId": kyoto["id"] }),
    )
    .await;

    let (status, _) = post_json(
        &viewer,
        app.url(&format!("/days/{day_id}/activities/reorder")),
        json!({ "order": [activity_ids[1], activity_ids[0]] }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = post_json(
        &viewer,
        app.url(&format!("/ideas/{}/promote", idea["id"])),
        json!({ "dayId": day_id }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for role in ["editor", "owner"] {
        let (status, _) = post_json(
            &viewer,
            format!("{trip_url}/memberships"),
            json!({ "email": "viewer@example.com", "role": role }),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let patch = viewer
        .patch(&trip_url)
        .json(&json!({ "name": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(patch.status(), StatusCode::FORBIDDEN);
    let body: Value = patch.json().await.unwrap();
    assert_eq!(body["error"], "view-only access");

    let (status, _) = post_json(
        &viewer,
        format!("{trip_url}/checklist"),
        json!({ "title": "Sneaky" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let delete = viewer.delete(&trip_url).send().await.unwrap();
    assert_eq!(delete.status(), StatusCode::FORBIDDEN);

    let stranger_read = stranger.get(&trip_url).send().await.unwrap();
    assert_eq!(stranger_read.status(), StatusCode::FORBIDDEN);

    // Reads still work for the viewer, and nothing changed.
    let current: Value = viewer
        .get(&trip_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(current["name"], "Kyoto");
    assert!(current["checklist"].as_array().unwrap().is_empty());
    let activities = current["days"][0]["activities"].as_array().unwrap();
    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0]["id"].as_i64(), Some(activity_ids[0]));
    assert_eq!(activities[0]["position"], 1);
    assert_eq!(activities[1]["position"], 2);
    assert_eq!(current["ideas"][0]["status"], "open");
    let roles: Vec<&str> = current["memberships"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["role"].as_str())
        .collect();
    assert_eq!(roles, vec!["owner", "viewer"]);

    // Anonymous readers are allowed by default.
    let anonymous = Client::new().get(&trip_url).send().await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::OK);
    let anonymous_write = Client::new()
        .patch(&trip_url)
        .json(&json!({ "name": "Anon" }))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous_write.status(), StatusCode::FORBIDDEN);

    let owner_delete = owner.delete(&trip_url).send().await.unwrap();
    assert_eq!(owner_delete.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn editors_cannot_take_over_a_trip() {
    let app = spawn_app().await;
    let owner = client();
    let editor = client();
    sign_up(&app, &owner, "owner@example.com").await;
    sign_up(&app, &editor, "editor@example.com").await;

    let trip = create_trip(&app, &owner, json!({ "name": "Hokkaido" })).await;
    let trip_url = app.url(&format!("/trips/{}", trip["id"]));
    let (status, _) = post_json(
        &owner,
        format!("{trip_url}/memberships"),
        json!({ "email": "editor@example.com", "role": "editor" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let delete = editor.delete(&trip_url).send().await.unwrap();
    assert_eq!(delete.status(), StatusCode::FORBIDDEN);

    let (status, body) = post_json(
        &editor,
        format!("{trip_url}/memberships"),
        json!({ "email": "editor@example.com", "role": "owner" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "role must be editor or viewer");

    let (status, body) = post_json(
        &editor,
        format!("{trip_url}/memberships"),
        json!({ "email": "owner@example.com", "role": "viewer" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "the trip owner's role cannot be changed");

    let (status, _) = post_json(
        &owner,
        format!("{trip_url}/memberships"),
        json!({ "email": "editor@example.com", "role": "owner" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let delete = editor.delete(&trip_url).send().await.unwrap();
    assert_eq!(delete.status(), StatusCode::FORBIDDEN);

    let members: Value = owner
        .get(format!("{trip_url}/memberships"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let roles: Vec<&str> = members
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["role"].as_str())
        .collect();
    assert_eq!(roles, vec!["owner", "editor"]);
    let still_there = owner.get(&trip_url).send().await.unwrap();
    assert_eq!(still_there.status(), StatusCode::OK);
}

#[tokio::test]
async fn other_trips_records_cannot_be_referenced() {
    let app = spawn_app().await;
    let victim = client();
    let attacker = client();
    sign_up(&app, &victim, "victim@example.com").await;
    sign_up(&app, &attacker, "attacker@example.com").await;

    let private = create_trip(
        &app,
        &victim,
        json!({ "name": "Private", "startDate": "2026-06-01", "endDate": "2026-06-01" }),
    )
    .await;
    let (_, hideout) = post_json(
        &victim,
        app.url(&format!("/trips/{}/cities", private["id"])),
        json!({ "name": "Hidden Hideout", "notes": "door code 4411" }),
    )
    .await;
    let victim_day = private["days"][0]["id"].as_i64().unwrap();

    let mine = create_trip(
        &app,
        &attacker,
        json!({ "name": "Mine", "startDate": "2026-07-01", "endDate": "2026-07-01" }),
    )
    .await;
    let my_trip = mine["id"].as_i64().unwrap();
    let my_day = mine["days"][0]["id"].as_i64().unwrap();

    let (status, body) = post_json(
        &attacker,
        app.url(&format!("/days/{my_day}/activities")),
        json!({ "title": "Snoop", "cityId": hideout["id"] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "city belongs to a different trip");
    assert!(!body.to_string().contains("door code"));

    let patch = attacker
        .patch(app.url(&format!("/days/{my_day}")))
        .json(&json!({ "cityIds": [hideout["id"]] }))
        .send()
        .await
        .unwrap();
    assert_eq!(patch.status(), StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &attacker,
        app.url(&format!("/trips/{my_trip}/places")),
        json!({ "name": "Lookout", "cityId": hideout["id"] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(
        &attacker,
        app.url(&format!("/trips/{my_trip}/bookings")),
        json!({ "title": "Train", "dayId": victim_day }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "day belongs to a different trip");

    let detail = attacker
        .get(app.url(&format!("/trips/{my_trip}")))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!detail.contains("Hidden Hideout"));
}

#[tokio::test]
async fn trip_length_is_capped() {
    let app = spawn_app().await;
    let owner = client();
    sign_up(&app, &owner, "owner@example.com").await;

    let (status, body) = post_json(
        &owner,
        app.url("/trips"),
        json!({ "name": "Forever", "startDate": "0001-01-01", "endDate": "9999-12-31" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "a trip may span at most 3660 days");

    let trip = create_trip(
        &app,
        &owner,
        json!({ "name": "Week", "startDate": "2026-03-16", "endDate": "2026-03-22" }),
    )
    .await;
    let trip_url = app.url(&format!("/trips/{}", trip["id"]));
    let patch = owner
        .patch(&trip_url)
        .json(&json!({ "endDate": "9999-12-31" }))
        .send()
        .await
        .unwrap();
    assert_eq!(patch.status(), StatusCode::BAD_REQUEST);

    let current: Value = owner
        .get(&trip_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(current["endDate"], "2026-03-22");
    assert_eq!(current["days"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn missing_records_are_404() {
    let app = spawn_app().await;
    let owner = client();
    sign_up(&app, &owner, "owner@example.com").await;

    let res = owner
        .delete(app.url("/activities/999"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Activity not found");

    let res = owner
        .patch(app.url("/checklist/999/toggle"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Checklist item not found");
}

#[tokio::test]
async fn activities_reorder_and_promotion() {
    let app = spawn_app().await;
    let owner = client();
    sign_up(&app, &owner, "owner@example.com").await;

    let trip = create_trip(
        &app,
        &owner,
        json!({ "name": "Japan", "startDate": "2026-03-17", "endDate": "2026-03-18", "homeTimeZone": "Europe/Madrid" }),
    )
    .await;
    let trip_id = trip["id"].as_i64().unwrap();
    let day_id = trip["days"][0]["id"].as_i64().unwrap();

    let (status, body) = post_json(
        &owner,
        app.url(&format!("/days/{day_id}/activities")),
        json!({ "title": "Lunch" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "cityId is required (or set on the day)");

    let (status, tokyo) = post_json(
        &owner,
        app.url(&format!("/trips/{trip_id}/cities")),
        json!({ "name": "Tokyo", "timeZone": "Asia/Tokyo", "lat": "35.6762", "lng": 139.6503 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tokyo_id = tokyo["id"].as_i64().unwrap();

    let mut activity_ids = Vec::new();
    for (title, start) in [("Shinjuku", "2026-03-17T00:30:00Z"), ("Ramen", "2026-03-17T03:00:00Z")] {
        let (status, activity) = post_json(
            &owner,
            app.url(&format!("/days/{day_id}/activities")),
            json!({ "title": title, "startTime": start, "cityId": tokyo_id.to_string() }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(activity["city"]["name"], "Tokyo");
        activity_ids.push(activity["id"].as_i64().unwrap());
    }

    let (status, reordered) = post_json(
        &owner,
        app.url(&format!("/days/{day_id}/activities/reorder")),
        json!({ "order": [activity_ids[1], activity_ids[0]] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reordered[0]["id"].as_i64(), Some(activity_ids[1]));
    assert_eq!(reordered[0]["position"], 1);

    let (status, body) = post_json(
        &owner,
        app.url(&format!("/days/{day_id}/activities/reorder")),
        json!({ "order": "nope" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "order must be an array of activity IDs");

    let (_, idea) = post_json(
        &owner,
        app.url(&format!("/trips/{trip_id}/ideas")),
        json!({ "title": "teamLab", "note": "book ahead", "category": "culture", "cityId": tokyo_id }),
    )
    .await;
    let idea_id = idea["id"].as_i64().unwrap();

    let (status, body) = post_json(
        &owner,
        app.url(&format!("/ideas/{idea_id}/promote")),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "dayId is required to promote");

    let (status, promoted) = post_json(
        &owner,
        app.url(&format!("/ideas/{idea_id}/promote")),
        json!({ "dayId": "date:2026-03-20", "startTime": "2026-03-20T01:00:00Z" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(promoted["activity"]["title"], "teamLab");
    assert_eq!(promoted["activity"]["ideaId"].as_i64(), Some(idea_id));

    let ideas: Value = owner
        .get(app.url(&format!("/trips/{trip_id}/ideas")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ideas[0]["status"], "promoted");

    let (_, place) = post_json(
        &owner,
        app.url(&format!("/trips/{trip_id}/places")),
        json!({ "name": "Omoide Yokocho", "address": "Nishi-Shinjuku", "cityId": tokyo_id }),
    )
    .await;
    let (status, promoted) = post_json(
        &owner,
        app.url(&format!("/places/{}/promote", place["id"])),
        json!({ "dayId": day_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(promoted["activity"]["location"], "Nishi-Shinjuku");
    assert_eq!(promoted["activity"]["position"], 3);

    let itinerary: Value = owner
        .get(app.url(&format!("/trips/{trip_id}/itinerary")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let first = &itinerary["days"][0];
    assert_eq!(first["date"], "2026-03-17");
    // Ramen was moved first: 03:00Z is 12:00 in Tokyo.
    assert_eq!(first["activities"][0]["timeLabel"], "12:00 JST");
    let days = itinerary["days"].as_array().unwrap();
    assert!(days.iter().any(|d| d["date"] == "2026-03-20"));
}

#[tokio::test]
async fn parse_link_reads_map_urls() {
    let app = spawn_app().await;
    let (status, parsed) = post_json(
        &client(),
        app.url("/places/parse-link"),
        json!({ "link": "https://www.google.com/maps/place/Fushimi+Inari+Taisha/@34.9671,135.7727,17z" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parsed["name"], "Fushimi Inari Taisha");
    assert_eq!(parsed["lat"], 34.9671);
    assert_eq!(parsed["lng"], 135.7727);

    let (status, _) = post_json(&client(), app.url("/places/parse-link"), json!({ "link": " " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logistics_round_trip() {
    let app = spawn_app().await;
    let owner = client();
    sign_up(&app, &owner, "owner@example.com").await;
    let trip = create_trip(&app, &owner, json!({ "name": "Budget" })).await;
    let trip_id = trip["id"].as_i64().unwrap();

    let (status, expense) = post_json(
        &owner,
        app.url(&format!("/trips/{trip_id}/expenses")),
        json!({ "amount": 5000, "note": "Suica" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["amount"], "5000");
    assert_eq!(expense["currency"], "JPY");

    let (status, item) = post_json(
        &owner,
        app.url(&format!("/trips/{trip_id}/checklist")),
        json!({ "title": "JR Pass" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let toggled: Value = owner
        .patch(app.url(&format!("/checklist/{}/toggle", item["id"])))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(toggled["done"], true);

    let (status, booking) = post_json(
        &owner,
        app.url(&format!("/trips/{trip_id}/bookings")),
        json!({ "title": "CA846", "type": "flight", "dateTime": "2026-03-16T11:25:00+01:00" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["type"], "flight");

    let (status, _) = post_json(
        &owner,
        app.url(&format!("/trips/{trip_id}/media")),
        json!({ "caption": "no url" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let deleted = owner
        .delete(app.url(&format!("/expenses/{}", expense["id"])))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    let expenses: Value = owner
        .get(app.url(&format!("/trips/{trip_id}/expenses")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(expenses.as_array().unwrap().is_empty());
}
