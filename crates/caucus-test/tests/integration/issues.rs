#![allow(clippy::unused_async)]
//! Integration tests for the top issues ranking.

use salvo::http::StatusCode;

use caucus_test::component::constants::TOP_ISSUES_ROUTE_PREFIX;

use super::helpers::*;

/// ## Summary
/// The five most mentioned issues come back count descending with shares of
/// the combined count.
#[test_log::test(tokio::test)]
async fn top_issues_ranked_with_percentages() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    for (name, count) in [
        ("Parks", 10),
        ("Housing", 40),
        ("Transit", 20),
        ("Schools", 20),
        ("Libraries", 5),
        ("Parking", 5),
        ("Noise", 1),
    ] {
        test_db
            .seed_issue(name, count)
            .await
            .expect("Failed to seed issue");
    }
    let service = create_db_test_service(&test_db.url()).await;

    let body = TestRequest::get(TOP_ISSUES_ROUTE_PREFIX)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    let issues = body.as_array().expect("Top issues should be an array");
    let names: Vec<&str> = issues
        .iter()
        .map(|issue| issue["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, ["Housing", "Transit", "Schools", "Parks", "Libraries"]);

    let percentages: Vec<i64> = issues
        .iter()
        .map(|issue| issue["percentage"].as_i64().expect("percentage"))
        .collect();
    assert_eq!(percentages, [42, 21, 21, 11, 5]);

    assert!(issues.iter().all(|issue| issue["trend"] == "stable"));
}

/// ## Summary
/// No issues is an empty list, not an error.
#[test_log::test(tokio::test)]
async fn top_issues_empty() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = create_db_test_service(&test_db.url()).await;

    let body = TestRequest::get(TOP_ISSUES_ROUTE_PREFIX)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body, serde_json::json!([]));
}

/// ## Summary
/// Recorded mentions move an issue up the ranking.
#[test_log::test(tokio::test)]
async fn mentions_raise_issue_rank() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let ada = test_db
        .seed_constituent("Ada", "Lovelace", "ada@example.com", None)
        .await
        .expect("Failed to seed constituent");
    let housing = test_db
        .seed_issue("Housing", 1)
        .await
        .expect("Failed to seed issue");
    let transit = test_db
        .seed_issue("Transit", 0)
        .await
        .expect("Failed to seed issue");
    for priority in [1, 2] {
        test_db
            .seed_mention(ada.id, transit, Some(priority))
            .await
            .expect("Failed to record mention");
    }
    let service = create_db_test_service(&test_db.url()).await;

    let body = TestRequest::get(TOP_ISSUES_ROUTE_PREFIX)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body[0]["id"], transit);
    assert_eq!(body[0]["count"], 2);
    assert_eq!(body[0]["percentage"], 67);
    assert_eq!(body[1]["id"], housing);
    assert_eq!(body[1]["percentage"], 33);
}
