#![allow(clippy::unused_async)]
//! Integration tests for bulk email queueing.

use salvo::http::StatusCode;
use serde_json::json;

use caucus_test::component::constants::SEND_EMAIL_ROUTE_PREFIX;

use super::helpers::*;

/// ## Summary
/// `"all"` queues one message per active constituent only.
#[test_log::test(tokio::test)]
async fn send_to_all_active() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    test_db
        .seed_constituent("Ada", "Lovelace", "ada@example.com", None)
        .await
        .expect("Failed to seed constituent");
    test_db
        .seed_constituent("Alan", "Turing", "alan@example.com", None)
        .await
        .expect("Failed to seed constituent");
    let removed = test_db
        .seed_constituent("Grace", "Hopper", "grace@example.com", None)
        .await
        .expect("Failed to seed constituent");
    test_db
        .set_active(removed.id, 1)
        .await
        .expect("Failed to set status");
    let service = create_db_test_service(&test_db.url()).await;
    let token = login_token(&service).await;

    let body = TestRequest::post(SEND_EMAIL_ROUTE_PREFIX)
        .bearer(&token)
        .json(&json!({
            "recipients": "all",
            "subject": "Town hall",
            "body": "See you Thursday.",
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["message"], "Email queued successfully");
    assert_eq!(body["queued"], 2);

    let outbox = test_db.outbox().await.expect("Failed to load outbox");
    let mut recipients: Vec<&str> = outbox.iter().map(|m| m.recipient.as_str()).collect();
    recipients.sort_unstable();
    assert_eq!(recipients, ["ada@example.com", "alan@example.com"]);
    assert!(outbox.iter().all(|m| m.subject == "Town hall" && m.sent_at.is_none()));
}

/// ## Summary
/// An ID list targets those constituents and skips unknown IDs.
#[test_log::test(tokio::test)]
async fn send_to_selected_ids() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let ada = test_db
        .seed_constituent("Ada", "Lovelace", "ada@example.com", None)
        .await
        .expect("Failed to seed constituent");
    test_db
        .seed_constituent("Alan", "Turing", "alan@example.com", None)
        .await
        .expect("Failed to seed constituent");
    let service = create_db_test_service(&test_db.url()).await;
    let token = login_token(&service).await;

    let body = TestRequest::post(SEND_EMAIL_ROUTE_PREFIX)
        .bearer(&token)
        .json(&json!({
            "recipients": [ada.id, ada.id, ada.id + 1000],
            "subject": "Hello",
            "body": "Thanks for signing up.",
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["queued"], 1);

    let outbox = test_db.outbox().await.expect("Failed to load outbox");
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].constituent_id, Some(ada.id));
}

/// ## Summary
/// Missing recipients, subject and body are reported together.
#[test_log::test(tokio::test)]
async fn send_validates_request() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = create_db_test_service(&test_db.url()).await;
    let token = login_token(&service).await;

    let body = TestRequest::post(SEND_EMAIL_ROUTE_PREFIX)
        .bearer(&token)
        .json(&json!({ "recipients": [], "subject": "" }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();

    let fields: Vec<&str> = body["errors"]
        .as_array()
        .expect("errors should be an array")
        .iter()
        .map(|e| e["field"].as_str().expect("field"))
        .collect();
    assert_eq!(fields, ["recipients", "subject", "body"]);

    assert!(test_db.outbox().await.expect("Failed to load outbox").is_empty());
}
