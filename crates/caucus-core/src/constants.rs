/// Route component constants shared across crates
pub const CONSTITUENTS_ROUTE_COMPONENT: &str = "constituents";
pub const CONSTITUENTS_ROUTE_PREFIX: &str = const_str::concat!("/", CONSTITUENTS_ROUTE_COMPONENT);

pub const UPLOAD_ROUTE_COMPONENT: &str = "upload";
pub const UPLOAD_ROUTE_PREFIX: &str =
    const_str::concat!(CONSTITUENTS_ROUTE_PREFIX, "/", UPLOAD_ROUTE_COMPONENT);
pub const DOWNLOAD_ROUTE_COMPONENT: &str = "download";
pub const DOWNLOAD_ROUTE_PREFIX: &str =
    const_str::concat!(CONSTITUENTS_ROUTE_PREFIX, "/", DOWNLOAD_ROUTE_COMPONENT);
pub const EXPORT_ROUTE_COMPONENT: &str = "export";
pub const EXPORT_ROUTE_PREFIX: &str =
    const_str::concat!(CONSTITUENTS_ROUTE_PREFIX, "/", EXPORT_ROUTE_COMPONENT);

pub const LOGIN_ROUTE_COMPONENT: &str = "login";
pub const LOGIN_ROUTE_PREFIX: &str = const_str::concat!("/", LOGIN_ROUTE_COMPONENT);
pub const TOP_ISSUES_ROUTE_COMPONENT: &str = "top-issues";
pub const TOP_ISSUES_ROUTE_PREFIX: &str = const_str::concat!("/", TOP_ISSUES_ROUTE_COMPONENT);
pub const DASHBOARD_ROUTE_COMPONENT: &str = "dashboard";
pub const DASHBOARD_SUMMARY_ROUTE_COMPONENT: &str = "summary";
pub const DASHBOARD_SUMMARY_ROUTE_PREFIX: &str = const_str::concat!(
    "/",
    DASHBOARD_ROUTE_COMPONENT,
    "/",
    DASHBOARD_SUMMARY_ROUTE_COMPONENT
);
pub const SEND_EMAIL_ROUTE_COMPONENT: &str = "send-email";
pub const SEND_EMAIL_ROUTE_PREFIX: &str = const_str::concat!("/", SEND_EMAIL_ROUTE_COMPONENT);
pub const HEALTHCHECK_ROUTE_COMPONENT: &str = "healthcheck";
pub const HEALTHCHECK_ROUTE_PREFIX: &str = const_str::concat!("/", HEALTHCHECK_ROUTE_COMPONENT);

/// Multipart field carrying an uploaded CSV.
pub const UPLOAD_FILE_FIELD: &str = "file";

/// Page size used when a page number is requested without a limit.
pub const DEFAULT_PAGE_LIMIT: i64 = 25;
/// Largest page size a client may request.
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Number of issues reported by the top-issues ranking.
pub const TOP_ISSUES_COUNT: i64 = 5;
/// Number of area codes reported by the dashboard summary.
pub const TOP_AREA_CODES_COUNT: usize = 10;

/// Columns required in an imported CSV header, in export order.
pub const IMPORT_REQUIRED_COLUMNS: [&str; 4] = ["firstName", "lastName", "email", "phone"];

/// Header written by the CSV export, in column order.
pub const EXPORT_COLUMNS: [&str; 5] = ["firstName", "lastName", "email", "phone", "signUpTime"];
