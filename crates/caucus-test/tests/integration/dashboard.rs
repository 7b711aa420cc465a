#![allow(clippy::unused_async)]
//! Integration tests for the dashboard summary.

use chrono::{TimeZone, Utc};
use salvo::http::StatusCode;

use caucus_test::component::constants::DASHBOARD_SUMMARY_ROUTE_PREFIX;

use super::helpers::*;

/// ## Summary
/// Sign-ups are bucketed by month and phone numbers grouped by area code.
#[test_log::test(tokio::test)]
async fn summary_aggregates_constituents() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    for (email, month, phone) in [
        ("a@example.com", 1, Some("(212) 555-0100")),
        ("b@example.com", 1, Some("+1 212 555 0101")),
        ("c@example.com", 3, Some("415-555-0102")),
        ("d@example.com", 12, Some("555-0103")),
        ("e@example.com", 12, None),
    ] {
        let sign_up = Utc
            .with_ymd_and_hms(2024, month, 10, 12, 0, 0)
            .single()
            .expect("Valid timestamp");
        test_db
            .seed_constituent_at("Test", "Person", email, phone, Some(sign_up))
            .await
            .expect("Failed to seed constituent");
    }
    let service = create_db_test_service(&test_db.url()).await;

    let body = TestRequest::get(DASHBOARD_SUMMARY_ROUTE_PREFIX)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["total"], 5);

    let months = body["signUpsByMonth"]
        .as_array()
        .expect("signUpsByMonth should be an array");
    assert_eq!(months.len(), 12);
    assert_eq!(months[0], serde_json::json!({ "month": "Jan", "count": 2 }));
    assert_eq!(months[2]["count"], 1);
    assert_eq!(months[11], serde_json::json!({ "month": "Dec", "count": 2 }));

    assert_eq!(
        body["topAreaCodes"],
        serde_json::json!([
            { "areaCode": "212", "count": 2 },
            { "areaCode": "415", "count": 1 },
        ])
    );
}

/// ## Summary
/// Listing parameters narrow the aggregated set.
#[test_log::test(tokio::test)]
async fn summary_honors_listing_parameters() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    test_db
        .seed_constituent("Ada", "Lovelace", "ada@example.com", Some("212-555-0100"))
        .await
        .expect("Failed to seed constituent");
    test_db
        .seed_constituent("Grace", "Hopper", "grace@example.com", Some("415-555-0100"))
        .await
        .expect("Failed to seed constituent");
    let service = create_db_test_service(&test_db.url()).await;

    let body = TestRequest::get(&format!("{DASHBOARD_SUMMARY_ROUTE_PREFIX}?search=grace"))
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["total"], 1);
    assert_eq!(body["topAreaCodes"][0]["areaCode"], "415");

    TestRequest::get(&format!("{DASHBOARD_SUMMARY_ROUTE_PREFIX}?sort=shoeSize"))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
