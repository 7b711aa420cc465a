#![allow(clippy::unused_async)]
//! Integration tests for constituent management.
//!
//! Tests:
//! - Creating and merging constituents by email
//! - Field validation
//! - Listing with search, sort, filter and paging
//! - Status updates and edits

use salvo::http::StatusCode;
use serde_json::json;

use caucus_test::component::constants::CONSTITUENTS_ROUTE_PREFIX;

use super::helpers::*;

fn constituent_path(id: impl std::fmt::Display) -> String {
    format!("{CONSTITUENTS_ROUTE_PREFIX}/{id}")
}

fn emails(body: &serde_json::Value) -> Vec<String> {
    body.as_array()
        .expect("Listing should be an array")
        .iter()
        .map(|c| c["email"].as_str().expect("email").to_string())
        .collect()
}

/// ## Summary
/// A new email creates a constituent and answers 201.
#[test_log::test(tokio::test)]
async fn add_creates_constituent() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = create_db_test_service(&test_db.url()).await;

    let mut payload = constituent_json("Ada", "Lovelace", "ada@example.com");
    payload["phone"] = json!("(212) 555-0100");
    payload["tags"] = json!(["volunteer", " ", "donor"]);

    let response = TestRequest::post(CONSTITUENTS_ROUTE_PREFIX)
        .json(&payload)
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED);

    let body = response.json();
    assert_eq!(body["message"], "Constituent added successfully");
    assert_eq!(body["constituent"]["firstName"], "Ada");
    assert_eq!(body["constituent"]["email"], "ada@example.com");
    assert_eq!(body["constituent"]["active"], 0);
    assert_eq!(body["constituent"]["tags"], json!(["volunteer", "donor"]));

    let stored = test_db
        .find_by_email("ada@example.com")
        .await
        .expect("Query failed")
        .expect("Constituent should be stored");
    assert_eq!(stored.phone.as_deref(), Some("(212) 555-0100"));
}

/// ## Summary
/// Posting an existing email merges into that row instead of inserting.
#[test_log::test(tokio::test)]
async fn add_existing_email_updates() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let existing = test_db
        .seed_constituent("Grace", "Hopper", "grace@example.com", Some("555-123-4567"))
        .await
        .expect("Failed to seed constituent");
    let service = create_db_test_service(&test_db.url()).await;

    let response = TestRequest::post(CONSTITUENTS_ROUTE_PREFIX)
        .json(&constituent_json("Grace", "Brewster", "grace@example.com"))
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    let body = response.json();
    assert_eq!(body["message"], "Constituent updated successfully");
    assert_eq!(body["constituent"]["id"], existing.id);
    assert_eq!(body["constituent"]["lastName"], "Brewster");
    assert_eq!(body["constituent"]["phone"], "555-123-4567");

    assert_eq!(test_db.count_constituents().await.expect("Count failed"), 1);
    assert_eq!(
        test_db
            .count_by_email("grace@example.com")
            .await
            .expect("Count failed"),
        1
    );

    let stored = test_db
        .find_by_email("grace@example.com")
        .await
        .expect("Query failed")
        .expect("Constituent should exist");
    assert_eq!(stored.sign_up_time, existing.sign_up_time);
    assert!(stored.updated_time >= existing.updated_time);
}

/// ## Summary
/// Every missing field is reported at once and nothing is written.
#[test_log::test(tokio::test)]
async fn add_reports_all_violations() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = create_db_test_service(&test_db.url()).await;

    let response = TestRequest::post(CONSTITUENTS_ROUTE_PREFIX)
        .json(&json!({ "firstName": "  " }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let errors = response.json()["errors"].clone();
    let fields: Vec<&str> = errors
        .as_array()
        .expect("errors should be an array")
        .iter()
        .map(|e| e["field"].as_str().expect("field"))
        .collect();
    assert_eq!(fields, ["firstName", "lastName", "email"]);

    assert_eq!(test_db.count_constituents().await.expect("Count failed"), 0);
}

/// ## Summary
/// Malformed email and phone values are rejected.
#[test_log::test(tokio::test)]
async fn add_rejects_bad_email_and_phone() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = create_db_test_service(&test_db.url()).await;

    let mut payload = constituent_json("Alan", "Turing", "not-an-email");
    payload["phone"] = json!("call me");

    TestRequest::post(CONSTITUENTS_ROUTE_PREFIX)
        .json(&payload)
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("Invalid email address")
        .assert_body_contains("Invalid phone number");
}

/// ## Summary
/// A body that is not JSON is a 400, not a 500.
#[test_log::test(tokio::test)]
async fn add_rejects_malformed_body() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = create_db_test_service(&test_db.url()).await;

    TestRequest::post(CONSTITUENTS_ROUTE_PREFIX)
        .content_type("application/json")
        .body("{not json")
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

/// ## Summary
/// Listing searches names, sorts and pages.
#[test_log::test(tokio::test)]
async fn list_search_sort_and_page() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    for (first, last, email) in [
        ("Ada", "Lovelace", "ada@example.com"),
        ("Grace", "Hopper", "grace@example.com"),
        ("Alan", "Turing", "alan@example.com"),
        ("Barbara", "Liskov", "barbara@example.com"),
    ] {
        test_db
            .seed_constituent(first, last, email, None)
            .await
            .expect("Failed to seed constituent");
    }
    let service = create_db_test_service(&test_db.url()).await;

    let all = TestRequest::get(CONSTITUENTS_ROUTE_PREFIX)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(all.as_array().map(Vec::len), Some(4));

    let search = TestRequest::get(&format!("{CONSTITUENTS_ROUTE_PREFIX}?search=LOV"))
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(emails(&search), ["ada@example.com"]);

    let sorted = TestRequest::get(&format!(
        "{CONSTITUENTS_ROUTE_PREFIX}?sort=firstName:desc&page=1&limit=2"
    ))
    .send(&service)
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_eq!(emails(&sorted), ["grace@example.com", "barbara@example.com"]);

    let second_page = TestRequest::get(&format!(
        "{CONSTITUENTS_ROUTE_PREFIX}?sort=firstName:desc&page=2&limit=2"
    ))
    .send(&service)
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_eq!(emails(&second_page), ["alan@example.com", "ada@example.com"]);
}

/// ## Summary
/// Column filters match exactly, and soft-deleted rows stay listable.
#[test_log::test(tokio::test)]
async fn list_filters_by_column() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    test_db
        .seed_constituent("Ada", "Lovelace", "ada@example.com", None)
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

    let inactive = TestRequest::get(&format!("{CONSTITUENTS_ROUTE_PREFIX}?filter=active:1"))
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(emails(&inactive), ["grace@example.com"]);

    let by_email = TestRequest::get(&format!(
        "{CONSTITUENTS_ROUTE_PREFIX}?filter=email:ada@example.com"
    ))
    .send(&service)
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_eq!(emails(&by_email), ["ada@example.com"]);
}

/// ## Summary
/// Unknown columns and bad paging values are client errors.
#[test_log::test(tokio::test)]
async fn list_rejects_bad_parameters() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = create_db_test_service(&test_db.url()).await;

    for query in [
        "sort=password:asc",
        "sort=firstName:sideways",
        "filter=nickname:ada",
        "filter=active",
        "filter=id:abc",
        "page=0",
        "limit=-5",
        "limit=100000",
    ] {
        TestRequest::get(&format!("{CONSTITUENTS_ROUTE_PREFIX}?{query}"))
            .send(&service)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

/// ## Summary
/// A non-zero status soft deletes; zero restores.
#[test_log::test(tokio::test)]
async fn set_status_soft_deletes_and_restores() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let constituent = test_db
        .seed_constituent("Ada", "Lovelace", "ada@example.com", None)
        .await
        .expect("Failed to seed constituent");
    let service = create_db_test_service(&test_db.url()).await;

    let body = TestRequest::patch(&constituent_path(constituent.id))
        .json(&json!({ "status": 1 }))
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["message"], "Constituent status updated successfully");
    assert_eq!(body["constituent"]["active"], 1);

    TestRequest::patch(&constituent_path(constituent.id))
        .json(&json!({ "status": 0 }))
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    let stored = test_db
        .find_by_email("ada@example.com")
        .await
        .expect("Query failed")
        .expect("Row is never removed");
    assert_eq!(stored.active, 0);
}

/// ## Summary
/// Status updates validate the id, the body and existence.
#[test_log::test(tokio::test)]
async fn set_status_errors() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let constituent = test_db
        .seed_constituent("Ada", "Lovelace", "ada@example.com", None)
        .await
        .expect("Failed to seed constituent");
    let service = create_db_test_service(&test_db.url()).await;

    TestRequest::patch(&constituent_path("abc"))
        .json(&json!({ "status": 1 }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    TestRequest::patch(&constituent_path(constituent.id))
        .json(&json!({ "status": "gone" }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("Status must be an integer");

    TestRequest::patch(&constituent_path(constituent.id + 1000))
        .json(&json!({ "status": 1 }))
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_body_contains("Constituent not found");
}

/// ## Summary
/// Editing changes only the supplied fields.
#[test_log::test(tokio::test)]
async fn edit_updates_supplied_fields() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let constituent = test_db
        .seed_constituent("Ada", "Lovelace", "ada@example.com", Some("555-000-1111"))
        .await
        .expect("Failed to seed constituent");
    let service = create_db_test_service(&test_db.url()).await;

    let body = TestRequest::put(&constituent_path(constituent.id))
        .json(&json!({ "city": "London", "lastName": "King" }))
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["message"], "Constituent updated successfully");
    assert_eq!(body["constituent"]["city"], "London");
    assert_eq!(body["constituent"]["lastName"], "King");
    assert_eq!(body["constituent"]["firstName"], "Ada");
    assert_eq!(body["constituent"]["phone"], "555-000-1111");
}

/// ## Summary
/// Edits reject blank required fields, unknown ids and taken emails.
#[test_log::test(tokio::test)]
async fn edit_errors() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let ada = test_db
        .seed_constituent("Ada", "Lovelace", "ada@example.com", None)
        .await
        .expect("Failed to seed constituent");
    test_db
        .seed_constituent("Grace", "Hopper", "grace@example.com", None)
        .await
        .expect("Failed to seed constituent");
    let service = create_db_test_service(&test_db.url()).await;

    TestRequest::put(&constituent_path(ada.id))
        .json(&json!({ "firstName": "" }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("First name cannot be empty");

    TestRequest::put(&constituent_path(ada.id + 1000))
        .json(&json!({ "city": "Paris" }))
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    TestRequest::put(&constituent_path(ada.id))
        .json(&json!({ "email": "grace@example.com" }))
        .send(&service)
        .await
        .assert_status(StatusCode::CONFLICT);
}
