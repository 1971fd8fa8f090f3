//! End-to-end ticket purchase, issuance and door check-in.

#[macro_use]
mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};
use site_backend::domain::PaymentIntentId;

use support::{ADMIN_EMAIL, Browser, Site, json};

fn contact() -> Value {
    json!({"name": "Ada Lovelace", "email": "ada@example.com", "phone": "4155550100"})
}

#[rstest]
#[actix_web::test]
async fn paid_checkout_issues_one_ticket_and_admin_checks_it_in() {
    let site = Site::new();
    let app = test::init_service(site.app()).await;
    let buyer = Browser::default();

    let (status, identified) = json(
        test::call_service(&app, buyer.post("/api/attendees/identify", contact()).to_request())
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(identified["existing"], false);

    let (status, returning) = json(
        test::call_service(&app, buyer.post("/api/attendees/identify", contact()).to_request())
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returning["existing"], true);
    assert_eq!(returning["attendeeId"], identified["attendeeId"]);

    let (status, intent) = json(
        test::call_service(
            &app,
            buyer
                .post(
                    "/api/create-payment-intent",
                    json!({"amount": 2500, "formData": contact()}),
                )
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let pi = intent["paymentIntentId"].as_str().expect("intent id").to_owned();
    assert!(intent["clientSecret"].as_str().is_some());

    let issue = json!({"paymentIntentId": pi});
    let (status, body) = json(
        test::call_service(&app, buyer.post("/api/tickets", issue.clone()).to_request()).await,
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED, "{body}");
    assert_eq!(body["details"]["status"], "requires_payment_method");

    assert!(site.gateway.confirm(&PaymentIntentId::new(&pi).expect("id")));

    let (status, first) = json(
        test::call_service(&app, buyer.post("/api/tickets", issue.clone()).to_request()).await,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["created"], true);
    assert_eq!(first["ticket"]["amountCents"], 2500);
    assert_eq!(first["ticket"]["checkedIn"], false);
    assert_eq!(
        first["ticket"]["qrUrl"],
        format!("https://events.example.com/admin/scan?pi={pi}")
    );

    let (status, second) = json(
        test::call_service(&app, buyer.post("/api/tickets", issue).to_request()).await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["created"], false);
    assert_eq!(second["ticket"]["id"], first["ticket"]["id"]);

    let (status, _) = json(
        test::call_service(&app, buyer.get(&format!("/api/admin/scan/{pi}")).to_request()).await,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut host = Browser::default();
    let session = sign_in!(app, host, ADMIN_EMAIL);
    assert_eq!(session["user"]["role"], "admin");

    let (status, scanned) = json(
        test::call_service(&app, host.get(&format!("/api/admin/scan/{pi}")).to_request()).await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scanned["name"], "Ada Lovelace");

    let toggle = format!("/api/admin/scan/{pi}/toggle");
    let (status, checked) = json(
        test::call_service(&app, host.post(&toggle, json!({})).to_request()).await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(checked["checkedIn"], true);
    assert!(checked["checkedInAt"].is_string());

    let (_, unchecked) = json(
        test::call_service(&app, host.post(&toggle, json!({})).to_request()).await,
    )
    .await;
    assert_eq!(unchecked["checkedIn"], false);
    assert!(unchecked.get("checkedInAt").is_none_or(Value::is_null));
}

#[rstest]
#[actix_web::test]
async fn members_cannot_scan_tickets() {
    let site = Site::new();
    let app = test::init_service(site.app()).await;
    let mut member = Browser::default();
    let session = sign_in!(app, member, "guest@example.com");
    assert_eq!(session["user"]["role"], "member");

    let (status, body) = json(
        test::call_service(
            &app,
            member.get("/api/admin/scan/pi_3MtwBwLkdIwHu7ix28a3tqPa").to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[rstest]
#[actix_web::test]
async fn wrong_code_does_not_sign_in() {
    let site = Site::new();
    let app = test::init_service(site.app()).await;
    let mut browser = Browser::default();
    test::call_service(
        &app,
        browser
            .post("/api/auth/otp", json!({"email": ADMIN_EMAIL}))
            .to_request(),
    )
    .await;

    let response = test::call_service(
        &app,
        browser
            .post("/api/auth/verify", json!({"email": ADMIN_EMAIL, "token": "123456"}))
            .to_request(),
    )
    .await;
    browser.remember(&response);
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, session) =
        json(test::call_service(&app, browser.get("/api/auth/session").to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert!(session.get("user").is_none_or(Value::is_null));
}

#[rstest]
#[actix_web::test]
async fn wallet_pass_is_not_available_yet() {
    let site = Site::new();
    let app = test::init_service(site.app()).await;
    let (status, body) = json(
        test::call_service(
            &app,
            Browser::default()
                .get("/api/tickets/3fa85f64-5717-4562-b3fc-2c963f66afa6/wallet-pass")
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["code"], "not_implemented");
}
