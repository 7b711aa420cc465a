#![allow(clippy::unused_async)]
//! Integration tests for CSV import and export.

use chrono::{SubsecRound, TimeZone, Utc};
use salvo::http::StatusCode;

use caucus_test::component::constants::{
    DOWNLOAD_ROUTE_PREFIX, EXPORT_ROUTE_PREFIX, UPLOAD_FILE_FIELD, UPLOAD_ROUTE_PREFIX,
};

use super::helpers::*;

const IMPORT_CSV: &str = "firstName,lastName,email,phone,city\n\
                          Ada,Lovelace,ada@example.com,(212) 555-0100,London\n\
                          \n\
                          Grace,Hopper,grace@example.com,555-123-4567,Arlington\n";

/// ## Summary
/// Export always carries the header, even with no rows.
#[test_log::test(tokio::test)]
async fn download_empty_has_header() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = create_db_test_service(&test_db.url()).await;

    let response = TestRequest::get(DOWNLOAD_ROUTE_PREFIX)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .assert_header_contains("Content-Type", "text/csv")
        .assert_header(
            "Content-Disposition",
            "attachment; filename=\"constituents.csv\"",
        );

    assert_eq!(
        response.body_string(),
        "firstName,lastName,email,phone,signUpTime\n"
    );
}

/// ## Summary
/// A date range keeps only sign-ups inside it, `to` inclusive of the whole day.
#[test_log::test(tokio::test)]
async fn export_date_range() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    for (email, day) in [
        ("before@example.com", 31),
        ("first@example.com", 1),
        ("last@example.com", 2),
    ] {
        let month = if day == 31 { 12 } else { 1 };
        let year = if day == 31 { 2023 } else { 2024 };
        let sign_up = Utc
            .with_ymd_and_hms(year, month, day, 18, 30, 0)
            .single()
            .expect("Valid timestamp");
        test_db
            .seed_constituent_at("Test", "Person", email, None, Some(sign_up))
            .await
            .expect("Failed to seed constituent");
    }
    let service = create_db_test_service(&test_db.url()).await;

    let response = TestRequest::get(&format!(
        "{EXPORT_ROUTE_PREFIX}?from=2024-01-01&to=2024-01-02"
    ))
    .send(&service)
    .await
    .assert_status(StatusCode::OK)
    .assert_header_contains(
        "Content-Disposition",
        "constituents_2024-01-01_to_2024-01-02.csv",
    );

    let body = response.body_string();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(
        lines,
        [
            "firstName,lastName,email,phone,signUpTime",
            "Test,Person,first@example.com,,2024-01-01T18:30:00.000Z",
            "Test,Person,last@example.com,,2024-01-02T18:30:00.000Z",
        ]
    );
}

/// ## Summary
/// Half-open or malformed ranges are rejected.
#[test_log::test(tokio::test)]
async fn export_rejects_bad_range() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = create_db_test_service(&test_db.url()).await;

    TestRequest::get(&format!("{EXPORT_ROUTE_PREFIX}?from=2024-01-01"))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    TestRequest::get(&format!("{EXPORT_ROUTE_PREFIX}?from=yesterday&to=2024-01-01"))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("Invalid date format");

    TestRequest::get(&format!("{EXPORT_ROUTE_PREFIX}?from=2024-02-01&to=2024-01-01"))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

/// ## Summary
/// Upload requires a bearer token.
#[test_log::test(tokio::test)]
async fn upload_requires_token() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = create_db_test_service(&test_db.url()).await;

    TestRequest::post(UPLOAD_ROUTE_PREFIX)
        .multipart_csv(UPLOAD_FILE_FIELD, "people.csv", IMPORT_CSV)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    TestRequest::post(UPLOAD_ROUTE_PREFIX)
        .bearer("not-a-real-token")
        .multipart_csv(UPLOAD_FILE_FIELD, "people.csv", IMPORT_CSV)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    assert_eq!(test_db.count_constituents().await.expect("Count failed"), 0);
}

/// ## Summary
/// Rows are created or merged by email and counted.
#[test_log::test(tokio::test)]
async fn upload_creates_and_merges() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let existing = test_db
        .seed_constituent("Grace", "Murray", "grace@example.com", None)
        .await
        .expect("Failed to seed constituent");
    let service = create_db_test_service(&test_db.url()).await;
    let token = login_token(&service).await;

    let before = Utc::now().trunc_subsecs(6);
    let body = TestRequest::post(UPLOAD_ROUTE_PREFIX)
        .bearer(&token)
        .multipart_csv(UPLOAD_FILE_FIELD, "people.csv", IMPORT_CSV)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    let after = Utc::now();

    assert_eq!(body["message"], "CSV uploaded and processed successfully");
    assert_eq!(body["created"], 1);
    assert_eq!(body["updated"], 1);

    assert_eq!(test_db.count_constituents().await.expect("Count failed"), 2);

    let grace = test_db
        .find_by_email("grace@example.com")
        .await
        .expect("Query failed")
        .expect("Grace should exist");
    assert_eq!(grace.id, existing.id);
    assert_eq!(grace.last_name, "Hopper");
    assert_eq!(grace.phone.as_deref(), Some("555-123-4567"));
    assert_eq!(grace.sign_up_time, existing.sign_up_time);

    let ada = test_db
        .find_by_email("ada@example.com")
        .await
        .expect("Query failed")
        .expect("Ada should exist");
    assert!(
        ada.sign_up_time >= before && ada.sign_up_time <= after,
        "sign-up time {} outside import window {before}..{after}",
        ada.sign_up_time
    );
}

/// ## Summary
/// The temporary copy of an upload is gone once the request finishes,
/// whether the import succeeded or failed.
#[test_log::test(tokio::test)]
async fn upload_leaves_no_temp_files() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
    let service = create_db_test_service_with_upload_dir(&test_db.url(), upload_dir.path()).await;
    let token = login_token(&service).await;

    TestRequest::post(UPLOAD_ROUTE_PREFIX)
        .bearer(&token)
        .multipart_csv(UPLOAD_FILE_FIELD, "people.csv", IMPORT_CSV)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(dir_entries(upload_dir.path()), Vec::<String>::new());

    TestRequest::post(UPLOAD_ROUTE_PREFIX)
        .bearer(&token)
        .multipart_csv(
            UPLOAD_FILE_FIELD,
            "people.csv",
            "firstName,lastName\nAda,Lovelace\n",
        )
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(dir_entries(upload_dir.path()), Vec::<String>::new());
}

/// ## Summary
/// An upload that does not declare its length is refused before it is read.
#[test_log::test(tokio::test)]
async fn upload_without_length_is_refused() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
    let service = create_db_test_service_with_upload_dir(&test_db.url(), upload_dir.path()).await;
    let token = login_token(&service).await;

    let body = "--chunked\r\n\
                Content-Disposition: form-data; name=\"file\"; filename=\"people.csv\"\r\n\
                \r\n\
                firstName,lastName,email,phone\r\n\
                --chunked--\r\n";

    TestRequest::post(UPLOAD_ROUTE_PREFIX)
        .bearer(&token)
        .content_type("multipart/form-data; boundary=chunked")
        .body(body)
        .send(&service)
        .await
        .assert_status(StatusCode::LENGTH_REQUIRED);

    assert_eq!(dir_entries(upload_dir.path()), Vec::<String>::new());
    assert_eq!(test_db.count_constituents().await.expect("Count failed"), 0);
}

/// ## Summary
/// A file missing required columns is rejected before any write.
#[test_log::test(tokio::test)]
async fn upload_missing_columns() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = create_db_test_service(&test_db.url()).await;
    let token = login_token(&service).await;

    TestRequest::post(UPLOAD_ROUTE_PREFIX)
        .bearer(&token)
        .multipart_csv(
            UPLOAD_FILE_FIELD,
            "people.csv",
            "firstName,lastName\nAda,Lovelace\n",
        )
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("CSV is missing required columns: email, phone");

    assert_eq!(test_db.count_constituents().await.expect("Count failed"), 0);
}

/// ## Summary
/// One bad row fails the whole import and names the row.
#[test_log::test(tokio::test)]
async fn upload_invalid_row_writes_nothing() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = create_db_test_service(&test_db.url()).await;
    let token = login_token(&service).await;

    let csv = "firstName,lastName,email,phone\n\
               Ada,Lovelace,ada@example.com,\n\
               Grace,Hopper,not-an-email,\n";

    let body = TestRequest::post(UPLOAD_ROUTE_PREFIX)
        .bearer(&token)
        .multipart_csv(UPLOAD_FILE_FIELD, "people.csv", csv)
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();

    assert_eq!(body["errors"][0]["row"], 2);
    assert_eq!(body["errors"][0]["field"], "email");

    assert_eq!(test_db.count_constituents().await.expect("Count failed"), 0);
}

/// ## Summary
/// Requests without the file field, or with an oversized body, are rejected.
#[test_log::test(tokio::test)]
async fn upload_missing_or_oversized_file() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = create_db_test_service(&test_db.url()).await;
    let token = login_token(&service).await;

    TestRequest::post(UPLOAD_ROUTE_PREFIX)
        .bearer(&token)
        .multipart_csv("attachment", "people.csv", IMPORT_CSV)
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("No file uploaded");

    let row = "Ada,Lovelace,ada@example.com,555-000-1111\n";
    let big = format!(
        "firstName,lastName,email,phone\n{}",
        row.repeat(256 * 1024 / row.len())
    );
    let request = TestRequest::post(UPLOAD_ROUTE_PREFIX)
        .bearer(&token)
        .multipart_csv(UPLOAD_FILE_FIELD, "big.csv", &big);
    let length = big.len() + 256;

    request
        .header("Content-Length", &length.to_string())
        .send(&service)
        .await
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE);

    assert_eq!(test_db.count_constituents().await.expect("Count failed"), 0);
}
