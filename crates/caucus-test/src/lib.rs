//! Caucus CRM - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can use
//! `caucus_test::` paths.

pub mod component {
    pub use caucus_core::{config, constants};
    pub use caucus_service::{auth, constituent, dashboard, error, exchange, mail, validation};

    pub mod db {
        pub use caucus_db::db::*;

        pub mod connection {
            pub use caucus_db::db::connection::*;
        }
    }

    pub mod model {
        pub use caucus_db::model::*;
    }

    pub mod middleware {
        pub use caucus_app::middleware::*;
    }

    pub mod shared {
        pub use caucus_app::shared::*;
    }
}

pub mod app {
    pub use caucus_app::*;

    pub mod api {
        pub use caucus_app::app::api::*;
    }
}
