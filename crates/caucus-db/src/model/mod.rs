pub mod api_token;
pub mod constituent;
pub mod constituent_issue;
pub mod issue;
pub mod outbound_email;
