pub mod api_token;
pub mod constituent;
pub mod issue;
pub mod outbound_email;
