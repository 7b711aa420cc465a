//! Dashboard aggregation: top issues, sign-ups by month and area codes.

mod summary;
mod top_issues;

pub use summary::{
    AreaCodeCount, DashboardSummary, MonthCount, dashboard_summary, extract_area_code,
    sign_ups_by_month, top_area_codes,
};
pub use top_issues::{TopIssue, Trend, rank_top_issues, top_issues};
