use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use lawlink::{AppState, auth, config::Config, db, email::Mailer, payments::StripeClient};

/// Fresh app over a fresh in-memory database. One connection, so every
/// clone of the router sees the same store.
async fn test_app() -> Router {
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open test database");
    db::init(&db_pool).await.expect("failed to apply schema");

    let config = Config::for_tests();
    let state = AppState {
        clients: auth::Clients::from_config(&config),
        stripe: StripeClient::new(&config),
        mailer: Mailer::new(&config),
        db_pool,
    };
    lawlink::app(state)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn client_payload(name: &str, email: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "password": "hunter2hunter2",
        "confirmPassword": "hunter2hunter2",
        "role": "CLIENT",
    })
}

fn lawyer_payload(name: &str, email: &str, specialties: &[&str], state: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "password": "hunter2hunter2",
        "confirmPassword": "hunter2hunter2",
        "role": "LAWYER",
        "licenseNumber": "123456",
        "licenseState": state,
        "specialties": specialties,
        "consultationFee": 150.0,
    })
}

/// Register + login, returning (user id, session cookie).
async fn sign_up(app: &Router, payload: Value) -> (String, String) {
    let (status, _, body) = request(app, "POST", "/api/auth/register", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    let user_id = body["user"]["id"].as_str().unwrap().to_owned();

    let (status, headers, body) = request(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({
            "email": payload["email"],
            "password": payload["password"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    let cookie = headers
        .get(header::SET_COOKIE)
        .expect("login should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned();
    (user_id, cookie)
}

// ---- registration ----

#[tokio::test]
async fn register_returns_public_fields_only() {
    let app = test_app().await;
    let (status, _, body) =
        request(&app, "POST", "/api/auth/register", None, Some(client_payload("Ana", "ana@example.com"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["user"]["email"], json!("ana@example.com"));
    assert_eq!(body["user"]["role"], json!("CLIENT"));
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn lawyer_registration_requires_credentials() {
    let app = test_app().await;
    for missing in ["licenseNumber", "licenseState", "specialties"] {
        let mut payload = lawyer_payload("Bruno", "bruno@example.com", &["tax"], "SP");
        match missing {
            "specialties" => payload["specialties"] = json!([]),
            key => {
                payload.as_object_mut().unwrap().remove(key);
            }
        }
        let (status, _, body) = request(&app, "POST", "/api/auth/register", None, Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{missing}: {body}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn first_validation_error_wins() {
    let app = test_app().await;
    let mut payload = client_payload("A", "not-an-email");
    payload["password"] = json!("short");
    let (status, _, body) = request(&app, "POST", "/api/auth/register", None, Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("name must be at least 2 characters"));
}

#[tokio::test]
async fn duplicate_email_is_conflict_after_normalization() {
    let app = test_app().await;
    let (status, _, _) =
        request(&app, "POST", "/api/auth/register", None, Some(client_payload("Ana", "ana@example.com"))).await;
    assert_eq!(status, StatusCode::OK);

    // same address, different case and surrounding whitespace
    let (status, _, body) =
        request(&app, "POST", "/api/auth/register", None, Some(client_payload("Ana II", "  ANA@Example.COM "))).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

#[tokio::test]
async fn registration_is_atomic_with_profile() {
    let app = test_app().await;
    let (_, cookie) = sign_up(&app, lawyer_payload("Bruno", "bruno@example.com", &["tax"], "SP")).await;

    // profile row exists right away, so the dashboard composes
    let (status, _, body) = request(&app, "GET", "/api/lawyer/dashboard", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["profile"]["licenseState"], json!("SP"));
}

// ---- login ----

#[tokio::test]
async fn login_failure_is_opaque() {
    let app = test_app().await;
    request(&app, "POST", "/api/auth/register", None, Some(client_payload("Ana", "ana@example.com"))).await;

    let (wrong_pw_status, _, wrong_pw_body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": "wrong-password" })),
    )
    .await;
    let (unknown_status, _, unknown_body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "whatever123" })),
    )
    .await;

    // unknown email and wrong password are indistinguishable
    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw_body["error"], unknown_body["error"]);
}

// ---- session gate ----

#[tokio::test]
async fn protected_path_redirects_to_login_with_callback() {
    let app = test_app().await;
    let (status, headers, _) = request(&app, "GET", "/dashboard", None, None).await;
    assert!(status.is_redirection());
    assert_eq!(
        headers.get(header::LOCATION).unwrap(),
        "/login?callbackUrl=%2Fdashboard"
    );
}

#[tokio::test]
async fn login_page_redirects_away_when_authenticated() {
    let app = test_app().await;
    let (_, cookie) = sign_up(&app, client_payload("Ana", "ana@example.com")).await;

    let (status, headers, _) = request(&app, "GET", "/login", Some(&cookie), None).await;
    assert!(status.is_redirection());
    assert_eq!(headers.get(header::LOCATION).unwrap(), "/dashboard");

    // without a session the login page renders
    let (status, _, _) = request(&app, "GET", "/login", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn protected_api_returns_401_json() {
    let app = test_app().await;
    let (status, _, body) = request(&app, "GET", "/api/notifications", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn webhook_is_reachable_without_session() {
    let app = test_app().await;
    let (status, _, body) = request(
        &app,
        "POST",
        "/api/payments/webhook",
        None,
        Some(json!({ "type": "checkout.session.completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], json!(true));
}

// ---- search ----

#[tokio::test]
async fn search_filters_conjunctively_and_paginates() {
    let app = test_app().await;
    sign_up(&app, lawyer_payload("Bruno", "bruno@example.com", &["tax", "immigration"], "SP")).await;
    sign_up(&app, lawyer_payload("Carla", "carla@example.com", &["family"], "RJ")).await;
    sign_up(&app, lawyer_payload("Davi", "davi@example.com", &["immigration"], "RJ")).await;

    let (status, _, body) =
        request(&app, "GET", "/api/lawyers/search?specialty=immigration&minRating=0", None, None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["total"], json!(2));
    assert_eq!(body["totalPages"], json!(1));

    let (_, _, body) =
        request(&app, "GET", "/api/lawyers/search?specialty=immigration&state=RJ", None, None).await;
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["lawyers"][0]["name"], json!("Davi"));

    // totalPages == ceil(total/limit), slice length <= limit
    let (_, _, body) = request(&app, "GET", "/api/lawyers/search?limit=2", None, None).await;
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["totalPages"], json!(2));
    assert_eq!(body["lawyers"].as_array().unwrap().len(), 2);
    let (_, _, body) = request(&app, "GET", "/api/lawyers/search?limit=2&page=2", None, None).await;
    assert_eq!(body["lawyers"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn search_rejects_out_of_range_params() {
    let app = test_app().await;
    let (status, _, _) = request(&app, "GET", "/api/lawyers/search?limit=51", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _, _) = request(&app, "GET", "/api/lawyers/search?page=0", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _, _) = request(&app, "GET", "/api/lawyers/search?minRating=6", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lawyer_slug_resolves_email_and_id() {
    let app = test_app().await;
    let (lawyer_id, _) = sign_up(&app, lawyer_payload("Bruno", "bruno@example.com", &["tax"], "SP")).await;

    let (status, _, body) = request(&app, "GET", "/api/lawyer/bruno@example.com", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lawyer"]["userId"], json!(lawyer_id));

    let (status, _, _) = request(&app, "GET", &format!("/api/lawyer/{lawyer_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = request(&app, "GET", "/api/lawyer/nobody@example.com", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---- booking ----

fn booking(lawyer_id: &str, start: &str, duration: i64) -> Value {
    json!({
        "lawyerId": lawyer_id,
        "title": "Initial consultation",
        "scheduledAt": start,
        "duration": duration,
    })
}

#[tokio::test]
async fn booking_rejects_overlaps_and_accepts_adjacent_slots() {
    let app = test_app().await;
    let (lawyer_id, _) = sign_up(&app, lawyer_payload("Bruno", "bruno@example.com", &["tax"], "SP")).await;
    let (_, cookie) = sign_up(&app, client_payload("Ana", "ana@example.com")).await;

    // existing active slot [10:00, 10:30)
    let (status, _, body) = request(
        &app,
        "POST",
        "/api/consultations/book",
        Some(&cookie),
        Some(booking(&lawyer_id, "2030-01-15T10:00:00Z", 30)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["consultation"]["status"], json!("SCHEDULED"));

    // [10:15, 10:45) overlaps
    let (status, _, _) = request(
        &app,
        "POST",
        "/api/consultations/book",
        Some(&cookie),
        Some(booking(&lawyer_id, "2030-01-15T10:15:00Z", 30)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // [10:30, 11:00) is adjacent, accepted
    let (status, _, _) = request(
        &app,
        "POST",
        "/api/consultations/book",
        Some(&cookie),
        Some(booking(&lawyer_id, "2030-01-15T10:30:00Z", 30)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // [09:30, 10:00) ends exactly at the existing start, accepted
    let (status, _, _) = request(
        &app,
        "POST",
        "/api/consultations/book",
        Some(&cookie),
        Some(booking(&lawyer_id, "2030-01-15T09:30:00Z", 30)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn booking_validates_input_and_target() {
    let app = test_app().await;
    let (lawyer_id, _) = sign_up(&app, lawyer_payload("Bruno", "bruno@example.com", &["tax"], "SP")).await;
    let (client_id, cookie) = sign_up(&app, client_payload("Ana", "ana@example.com")).await;

    let (status, _, _) = request(
        &app,
        "POST",
        "/api/consultations/book",
        Some(&cookie),
        Some(booking(&lawyer_id, "2030-01-15T10:00:00Z", 10)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST); // duration below 15

    let (status, _, _) = request(
        &app,
        "POST",
        "/api/consultations/book",
        Some(&cookie),
        Some(booking(&lawyer_id, "not-a-timestamp", 30)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = request(
        &app,
        "POST",
        "/api/consultations/book",
        Some(&cookie),
        Some(booking("no-such-id", "2030-01-15T10:00:00Z", 30)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // a client is not a bookable target
    let (status, _, _) = request(
        &app,
        "POST",
        "/api/consultations/book",
        Some(&cookie),
        Some(booking(&client_id, "2030-01-15T10:00:00Z", 30)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---- messaging ----

#[tokio::test]
async fn non_members_get_forbidden_not_not_found() {
    let app = test_app().await;
    let (_, ana_cookie) = sign_up(&app, client_payload("Ana", "ana@example.com")).await;
    let (bruno_id, bruno_cookie) =
        sign_up(&app, lawyer_payload("Bruno", "bruno@example.com", &["tax"], "SP")).await;
    let (_, eve_cookie) = sign_up(&app, client_payload("Eve", "eve@example.com")).await;

    let (status, _, body) = request(
        &app,
        "POST",
        "/api/conversations",
        Some(&ana_cookie),
        Some(json!({ "participantId": bruno_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let conversation_id = body["conversation"]["id"].as_str().unwrap().to_owned();

    let send = json!({ "conversationId": conversation_id, "content": "hello" });
    let (status, _, _) = request(&app, "POST", "/api/messages/send", Some(&ana_cookie), Some(send.clone())).await;
    assert_eq!(status, StatusCode::OK);

    // outsider: 403 on send and read, never 404
    let (status, _, _) = request(&app, "POST", "/api/messages/send", Some(&eve_cookie), Some(send)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _, _) = request(
        &app,
        "GET",
        &format!("/api/messages?conversationId={conversation_id}"),
        Some(&eve_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // both participants can read
    for cookie in [&ana_cookie, &bruno_cookie] {
        let (status, _, body) = request(
            &app,
            "GET",
            &format!("/api/messages?conversationId={conversation_id}"),
            Some(cookie),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messages"][0]["content"], json!("hello"));
    }

    // absent conversation is a 404 for anyone
    let (status, _, _) = request(
        &app,
        "GET",
        "/api/messages?conversationId=no-such-conversation",
        Some(&ana_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn messages_come_back_oldest_first() {
    let app = test_app().await;
    let (_, ana_cookie) = sign_up(&app, client_payload("Ana", "ana@example.com")).await;
    let (bruno_id, _) = sign_up(&app, lawyer_payload("Bruno", "bruno@example.com", &["tax"], "SP")).await;

    let (_, _, body) = request(
        &app,
        "POST",
        "/api/conversations",
        Some(&ana_cookie),
        Some(json!({ "participantId": bruno_id })),
    )
    .await;
    let conversation_id = body["conversation"]["id"].as_str().unwrap().to_owned();

    for content in ["first", "second", "third"] {
        let (status, _, _) = request(
            &app,
            "POST",
            "/api/messages/send",
            Some(&ana_cookie),
            Some(json!({ "conversationId": conversation_id, "content": content })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, _, body) = request(
        &app,
        "GET",
        &format!("/api/messages?conversationId={conversation_id}"),
        Some(&ana_cookie),
        None,
    )
    .await;
    let contents: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, ["first", "second", "third"]);
}

// ---- notifications ----

#[tokio::test]
async fn notifications_target_must_exist_and_unread_filter_works() {
    let app = test_app().await;
    let (ana_id, ana_cookie) = sign_up(&app, client_payload("Ana", "ana@example.com")).await;

    let (status, _, _) = request(
        &app,
        "POST",
        "/api/notifications/send",
        Some(&ana_cookie),
        Some(json!({
            "userId": "no-such-user",
            "title": "hi",
            "content": "there",
            "type": "INFO",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = request(
        &app,
        "POST",
        "/api/notifications/send",
        Some(&ana_cookie),
        Some(json!({
            "userId": ana_id,
            "title": "Case update",
            "content": "Your case moved forward.",
            "type": "INFO",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) =
        request(&app, "GET", "/api/notifications?unreadOnly=true", Some(&ana_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notifications"].as_array().unwrap().len(), 1);
    assert_eq!(body["notifications"][0]["read"], json!(false));
}

// ---- payments ----

#[tokio::test]
async fn checkout_validates_before_touching_stripe() {
    let app = test_app().await;
    let (lawyer_id, _) = sign_up(&app, lawyer_payload("Bruno", "bruno@example.com", &["tax"], "SP")).await;
    let (_, ana_cookie) = sign_up(&app, client_payload("Ana", "ana@example.com")).await;
    let (_, eve_cookie) = sign_up(&app, client_payload("Eve", "eve@example.com")).await;

    let (_, _, body) = request(
        &app,
        "POST",
        "/api/consultations/book",
        Some(&ana_cookie),
        Some(booking(&lawyer_id, "2030-01-15T10:00:00Z", 30)),
    )
    .await;
    let consultation_id = body["consultation"]["id"].as_str().unwrap().to_owned();

    let (status, _, _) = request(
        &app,
        "POST",
        "/api/payments/create-checkout",
        Some(&ana_cookie),
        Some(json!({ "consultationId": consultation_id, "amount": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST); // below minimum

    let (status, _, _) = request(
        &app,
        "POST",
        "/api/payments/create-checkout",
        Some(&ana_cookie),
        Some(json!({ "consultationId": "no-such-consultation", "amount": 5000 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // someone else's consultation
    let (status, _, _) = request(
        &app,
        "POST",
        "/api/payments/create-checkout",
        Some(&eve_cookie),
        Some(json!({ "consultationId": consultation_id, "amount": 5000 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ---- dashboards ----

#[tokio::test]
async fn dashboards_enforce_role() {
    let app = test_app().await;
    let (_, lawyer_cookie) = sign_up(&app, lawyer_payload("Bruno", "bruno@example.com", &["tax"], "SP")).await;
    let (_, client_cookie) = sign_up(&app, client_payload("Ana", "ana@example.com")).await;

    let (status, _, _) = request(&app, "GET", "/api/client/dashboard", Some(&lawyer_cookie), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _, _) = request(&app, "GET", "/api/lawyer/dashboard", Some(&client_cookie), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = request(&app, "GET", "/api/client/dashboard", Some(&client_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalCases"], json!(0));
    assert_eq!(body["stats"]["totalSpent"], json!(0));
}

#[tokio::test]
async fn dashboards_aggregate_caller_scoped_records() {
    let app = test_app().await;
    let (lawyer_id, lawyer_cookie) =
        sign_up(&app, lawyer_payload("Bruno", "bruno@example.com", &["tax"], "SP")).await;
    let (_, ana_cookie) = sign_up(&app, client_payload("Ana", "ana@example.com")).await;

    let (status, _, _) = request(
        &app,
        "POST",
        "/api/cases",
        Some(&ana_cookie),
        Some(json!({ "lawyerId": lawyer_id, "title": "Visa application" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    request(
        &app,
        "POST",
        "/api/consultations/book",
        Some(&ana_cookie),
        Some(booking(&lawyer_id, "2030-01-15T10:00:00Z", 30)),
    )
    .await;

    let (_, _, body) = request(&app, "GET", "/api/client/dashboard", Some(&ana_cookie), None).await;
    assert_eq!(body["stats"]["totalCases"], json!(1));
    assert_eq!(body["stats"]["activeCases"], json!(1));
    assert_eq!(body["cases"][0]["lawyer"]["name"], json!("Bruno"));

    let (_, _, body) = request(&app, "GET", "/api/lawyer/dashboard", Some(&lawyer_cookie), None).await;
    assert_eq!(body["stats"]["totalConsultations"], json!(1));
    assert_eq!(body["stats"]["totalCases"], json!(1));
    assert_eq!(body["consultations"][0]["client"]["name"], json!("Ana"));
}

// ---- events ----

#[tokio::test]
async fn events_track_and_aggregate() {
    let app = test_app().await;
    let (_, cookie) = sign_up(&app, client_payload("Ana", "ana@example.com")).await;

    for (name, kind) in [
        ("home", "PAGE_VIEW"),
        ("lawyer-profile", "PAGE_VIEW"),
        ("booked", "CONSULTATION_BOOKED"),
    ] {
        let (status, _, _) = request(
            &app,
            "POST",
            "/api/events/track",
            Some(&cookie),
            Some(json!({ "eventName": name, "eventType": kind, "metadata": { "source": "test" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _, body) = request(&app, "GET", "/api/events", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalEvents"], json!(3));
    assert_eq!(body["stats"]["eventsByType"]["PAGE_VIEW"], json!(2));

    let (_, _, body) = request(&app, "GET", "/api/events?eventType=PAGE_VIEW", Some(&cookie), None).await;
    assert_eq!(body["stats"]["totalEvents"], json!(2));
}

#[tokio::test]
async fn events_window_tolerates_extreme_days() {
    let app = test_app().await;
    let (_, cookie) = sign_up(&app, client_payload("Ana", "ana@example.com")).await;

    let (status, _, _) = request(
        &app,
        "POST",
        "/api/events/track",
        Some(&cookie),
        Some(json!({ "eventName": "home", "eventType": "PAGE_VIEW" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // days is clamped, never multiplied raw
    for days in ["9223372036854775807", "-9223372036854775808", "0"] {
        let (status, _, body) =
            request(&app, "GET", &format!("/api/events?days={days}"), Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK, "days={days}: {body}");
    }

    let (_, _, body) = request(
        &app,
        "GET",
        "/api/events?days=9223372036854775807",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(body["stats"]["totalEvents"], json!(1));
}

// ---- end to end ----

#[tokio::test]
async fn client_finds_lawyer_books_and_chats() {
    let app = test_app().await;
    let (_, ana_cookie) = sign_up(&app, client_payload("Ana", "ana@example.com")).await;
    let (bruno_id, bruno_cookie) = sign_up(
        &app,
        lawyer_payload("Bruno", "bruno@example.com", &["immigration", "tax"], "SP"),
    )
    .await;
    let (_, eve_cookie) = sign_up(&app, client_payload("Eve", "eve@example.com")).await;

    // search by one of the lawyer's specialties
    let (status, _, body) =
        request(&app, "GET", "/api/lawyers/search?specialty=tax&minRating=0", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["lawyers"][0]["userId"], json!(bruno_id));

    // book a free slot
    let (status, _, _) = request(
        &app,
        "POST",
        "/api/consultations/book",
        Some(&ana_cookie),
        Some(booking(&bruno_id, "2030-02-01T14:00:00Z", 60)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // open a conversation and send a message
    let (_, _, body) = request(
        &app,
        "POST",
        "/api/conversations",
        Some(&ana_cookie),
        Some(json!({ "participantId": bruno_id })),
    )
    .await;
    let conversation_id = body["conversation"]["id"].as_str().unwrap().to_owned();
    let (status, _, _) = request(
        &app,
        "POST",
        "/api/messages/send",
        Some(&ana_cookie),
        Some(json!({ "conversationId": conversation_id, "content": "See you on the 1st" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // retrievable by both participants, by nobody else
    for cookie in [&ana_cookie, &bruno_cookie] {
        let (status, _, body) = request(
            &app,
            "GET",
            &format!("/api/messages?conversationId={conversation_id}"),
            Some(cookie),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messages"][0]["content"], json!("See you on the 1st"));
    }
    let (status, _, _) = request(
        &app,
        "GET",
        &format!("/api/messages?conversationId={conversation_id}"),
        Some(&eve_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
