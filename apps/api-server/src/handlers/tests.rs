use actix_web::http::{Method, StatusCode};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use super::{configure_app, not_found};
use crate::middleware::admin::ADMIN_HEADER;
use crate::state::AppState;

const PASSWORD: &str = "correct horse battery staple";
const CLIENT: &str = "203.0.113.5:41000";

macro_rules! app {
    ($state:expr) => {{
        let state: AppState = $state;
        test::init_service(
            App::new()
                .configure(|cfg| configure_app(cfg, &state))
                .default_service(web::to(not_found)),
        )
        .await
    }};
}

fn state() -> AppState {
    AppState::in_memory(Some(PASSWORD)).unwrap()
}

fn contact_body() -> Value {
    json!({
        "name": "Grace Hopper",
        "email": "grace@example.com",
        "message": "Would you be interested in a talk about compilers?"
    })
}

fn post_body(title: &str, status: &str) -> Value {
    json!({
        "title": title,
        "content": "A post body that is comfortably longer than fifty characters in total.",
        "category": "Programming",
        "tags": ["Rust", "actix"],
        "status": status
    })
}

fn admin(method: Method, uri: &str) -> test::TestRequest {
    test::TestRequest::default()
        .method(method)
        .uri(uri)
        .insert_header((ADMIN_HEADER, PASSWORD))
}

fn submission() -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/contacts")
        .peer_addr(CLIENT.parse().unwrap())
        .insert_header(("user-agent", "handler-tests"))
}

#[actix_rt::test]
async fn health_reports_ok() {
    let app = app!(state());

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["environment"], "test");
}

#[actix_rt::test]
async fn unknown_route_is_an_envelope_404() {
    let app = app!(state());

    let req = test::TestRequest::get().uri("/api/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route /api/nope not found");
}

#[actix_rt::test]
async fn contact_submission_returns_receipt() {
    let app = app!(state());

    let req = submission().set_json(contact_body()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Grace Hopper");
    assert_eq!(body["data"]["email"], "grace@example.com");
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["createdAt"].is_string());
    assert!(body["data"].get("ipAddress").is_none());
}

#[actix_rt::test]
async fn invalid_contact_lists_field_errors() {
    let app = app!(state());

    let req = submission()
        .set_json(json!({ "name": "Grace Hopper", "email": "grace@example.com", "message": "short" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"][0]["field"], "message");
    assert_eq!(body["errors"][0]["message"], "Message must be 10-5000 characters");
}

#[actix_rt::test]
async fn sixth_submission_is_rate_limited() {
    let app = app!(state());

    for _ in 0..5 {
        let req = submission().set_json(contact_body()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = submission().set_json(contact_body()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.headers().get("retry-after").unwrap(), "900");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        "Too many submissions. Please try again in 15 minutes."
    );

    // Reads are not limited.
    let req = admin(Method::GET, "/api/contacts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn admin_routes_require_the_password() {
    let app = app!(state());

    let req = test::TestRequest::get().uri("/api/contacts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Unauthorized. Invalid admin password.");

    let req = test::TestRequest::get()
        .uri("/api/posts/admin/stats")
        .insert_header((ADMIN_HEADER, "wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = admin(Method::GET, "/api/contacts").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["pagination"],
        json!({ "current": 1, "pages": 0, "total": 0, "limit": 20 })
    );
}

#[actix_rt::test]
async fn unset_password_disables_admin() {
    let app = app!(AppState::in_memory(None).unwrap());

    let req = admin(Method::GET, "/api/contacts/stats").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Admin access is disabled");

    let req = test::TestRequest::post()
        .uri("/api/posts/admin/auth")
        .set_json(json!({ "password": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn admin_auth_endpoint() {
    let app = app!(state());

    let req = test::TestRequest::post()
        .uri("/api/posts/admin/auth")
        .set_json(json!({ "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/posts/admin/auth")
        .set_json(json!({ "password": "guess" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid password");
}

#[actix_rt::test]
async fn contact_admin_flow() {
    let app = app!(state());

    let req = submission().set_json(contact_body()).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/contacts/{id}");

    let req = admin(Method::GET, &uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "new");
    assert_eq!(body["data"]["ipAddress"], "203.0.113.5");
    assert_eq!(body["data"]["userAgent"], "handler-tests");

    let req = admin(Method::PATCH, &uri)
        .set_json(json!({ "status": "bogus" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"][0]["field"], "status");

    let req = admin(Method::PATCH, &uri)
        .set_json(json!({ "status": "read" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "read");

    let req = admin(Method::GET, "/api/contacts/stats").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], json!({ "total": 1, "new": 0, "today": 1 }));

    let req = admin(Method::GET, "/api/contacts").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"][0]["id"], id.as_str());
    assert!(body["data"][0].get("ipAddress").is_none());

    let req = admin(Method::DELETE, &uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = admin(Method::DELETE, &uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn non_uuid_id_is_not_found() {
    let app = app!(state());

    let req = admin(Method::GET, "/api/contacts/not-a-uuid").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Contact not found");
}

#[actix_rt::test]
async fn non_numeric_paging_is_a_bad_request() {
    let app = app!(state());

    let req = test::TestRequest::get().uri("/api/posts?page=abc").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn oversized_body_is_rejected() {
    let app = app!(state());

    let req = submission()
        .set_json(json!({ "name": "Big", "email": "big@example.com", "message": "x".repeat(40 * 1024) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    // Small-body routes keep the tight default.
    let req = admin(Method::PATCH, &format!("/api/contacts/{}", uuid::Uuid::new_v4()))
        .set_json(json!({ "status": "x".repeat(11 * 1024) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[actix_rt::test]
async fn longest_multibyte_message_is_accepted() {
    let app = app!(state());

    let message = "字".repeat(5000);
    assert_eq!(message.len(), 15_000);
    let req = submission()
        .set_json(json!({ "name": "Grace Hopper", "email": "grace@example.com", "message": message }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[actix_rt::test]
async fn long_posts_can_be_written() {
    let app = app!(state());

    let content = "word ".repeat(2500);
    let req = admin(Method::POST, "/api/posts/admin")
        .set_json(json!({ "title": "A long article", "content": content }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["data"]["readTime"], 13);

    let id = created["data"]["id"].as_str().unwrap();
    let req = admin(Method::PUT, &format!("/api/posts/admin/{id}"))
        .set_json(json!({ "title": "A long article", "content": "word ".repeat(5000) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn forwarded_header_does_not_reset_the_limit() {
    let app = app!(state());

    for i in 0..5 {
        let req = submission()
            .insert_header(("x-forwarded-for", format!("10.9.9.{i}")))
            .set_json(contact_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;

        let uri = format!("/api/contacts/{}", body["data"]["id"].as_str().unwrap());
        let req = admin(Method::GET, &uri).to_request();
        let stored: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stored["data"]["ipAddress"], "203.0.113.5");
    }

    let req = submission()
        .insert_header(("x-forwarded-for", "10.9.9.99"))
        .set_json(contact_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[actix_rt::test]
async fn huge_page_number_is_an_empty_page() {
    let app = app!(state());

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts?page={}", u64::MAX))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"], json!([]));
}

#[actix_rt::test]
async fn browser_preflight_is_answered() {
    let app = app!(state());

    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/api/contacts/00000000-0000-0000-0000-000000000000")
        .insert_header(("origin", "http://localhost:5173"))
        .insert_header(("access-control-request-method", "PATCH"))
        .insert_header(("access-control-request-headers", "content-type, x-admin-password"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );
    let allowed = resp
        .headers()
        .get("access-control-allow-headers")
        .unwrap()
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("x-admin-password"));

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header(("origin", "http://localhost:5173"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );
}

#[actix_rt::test]
async fn responses_carry_hardening_headers() {
    let app = app!(state());

    let req = test::TestRequest::get().uri("/api").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(resp.headers().get("x-frame-options").unwrap(), "SAMEORIGIN");
    assert_eq!(resp.headers().get("referrer-policy").unwrap(), "no-referrer");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["endpoints"]["health"], "GET /api/health");
}

#[actix_rt::test]
async fn post_publication_flow() {
    let app = app!(state());

    let req = admin(Method::POST, "/api/posts/admin")
        .set_json(post_body("Hello World!!!", "draft"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let slug = created["data"]["slug"].as_str().unwrap().to_string();
    assert!(slug.starts_with("hello-world-"));
    assert_eq!(created["data"]["tags"], json!(["rust", "actix"]));
    assert_eq!(created["data"]["readTime"], 1);

    // Drafts look exactly like missing posts.
    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{slug}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = admin(Method::PUT, &format!("/api/posts/admin/{id}"))
        .set_json(post_body("Hello World!!!", "published"))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert!(updated["data"]["publishedAt"].is_string());

    for expected in 1..=2 {
        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{slug}"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["views"], expected);
    }

    let req = test::TestRequest::get()
        .uri("/api/posts?category=Programming&tag=RUST")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["pagination"]["limit"], 10);
    assert!(body["data"][0].get("content").is_none());

    let req = test::TestRequest::get().uri("/api/posts/tags").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"][0], json!({ "name": "actix", "count": 1 }));

    let req = admin(Method::GET, "/api/posts/admin/stats").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["totalPosts"], 1);
    assert_eq!(body["data"]["totalViews"], 2);
    assert_eq!(body["data"]["byStatus"]["published"], 1);

    let req = admin(Method::DELETE, &format!("/api/posts/admin/{id}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
