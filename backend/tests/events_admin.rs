//! Event administration and event-priced checkout.

#[macro_use]
mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use support::{ADMIN_EMAIL, Browser, Site, json};

fn mixer() -> Value {
    json!({
        "title": "Singles mixer",
        "description": "Drinks and icebreakers",
        "location": "Brooklyn",
        "startsAt": "2026-11-06T19:00:00Z",
        "endsAt": "2026-11-06T22:00:00Z",
        "priceCents": 2500,
        "capacity": 80,
        "imageUrl": " https://cdn.example.com/mixer.jpg "
    })
}

#[rstest]
#[actix_web::test]
async fn admins_manage_events_and_visitors_see_them() {
    let site = Site::new();
    let app = test::init_service(site.app()).await;
    let visitor = Browser::default();

    let (status, _) =
        json(test::call_service(&app, visitor.post("/api/events", mixer()).to_request()).await)
            .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut host = Browser::default();
    sign_in!(app, host, ADMIN_EMAIL);

    let (status, created) =
        json(test::call_service(&app, host.post("/api/events", mixer()).to_request()).await).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["imageUrl"], "https://cdn.example.com/mixer.jpg");
    let id = created["id"].as_str().expect("event id").to_owned();

    let mut changes = mixer();
    changes["priceCents"] = json!(3000);
    let (status, updated) = json(
        test::call_service(&app, host.put(&format!("/api/events/{id}"), changes).to_request())
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["priceCents"], 3000);
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (status, listed) =
        json(test::call_service(&app, visitor.get("/api/events").to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["events"].as_array().map(Vec::len), Some(1));
    assert!(listed.get("user").is_none());

    let (status, mine) =
        json(test::call_service(&app, host.get("/api/events?mine=1").to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["events"][0]["id"], id.as_str());
    assert_eq!(mine["user"]["email"], ADMIN_EMAIL);

    let response =
        test::call_service(&app, host.delete(&format!("/api/events/{id}")).to_request()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = json(
        test::call_service(&app, visitor.get(&format!("/api/events/{id}")).to_request()).await,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn mine_requires_a_session() {
    let site = Site::new();
    let app = test::init_service(site.app()).await;
    let (status, body) = json(
        test::call_service(&app, Browser::default().get("/api/events?mine=1").to_request()).await,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn event_checkout_charges_the_listed_price() {
    let site = Site::new();
    let app = test::init_service(site.app()).await;
    let mut host = Browser::default();
    sign_in!(app, host, ADMIN_EMAIL);
    let (_, created) =
        json(test::call_service(&app, host.post("/api/events", mixer()).to_request()).await).await;
    let event_id = created["id"].clone();

    let buyer = Browser::default();
    let form = json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "phone": "4155550100",
        "eventId": event_id,
        "quantity": 2
    });

    let (status, body) = json(
        test::call_service(
            &app,
            buyer
                .post(
                    "/api/create-payment-intent",
                    json!({"amount": 2500, "formData": form.clone()}),
                )
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "amount_mismatch");
    assert_eq!(body["details"]["expected"], 5000);

    let (status, body) = json(
        test::call_service(
            &app,
            buyer
                .post(
                    "/api/create-payment-intent",
                    json!({"amount": 5000, "formData": form}),
                )
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paymentIntentId"].as_str().is_some());
}

#[rstest]
#[actix_web::test]
async fn invalid_image_urls_are_rejected() {
    let site = Site::new();
    let app = test::init_service(site.app()).await;
    let mut host = Browser::default();
    sign_in!(app, host, ADMIN_EMAIL);

    let mut event = mixer();
    event["imageUrl"] = json!("not a url");
    let (status, body) =
        json(test::call_service(&app, host.post("/api/events", event).to_request()).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "imageUrl");
    assert_eq!(body["details"]["code"], "invalid_url");
}
