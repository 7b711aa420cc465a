//! Database layer: schema, models, migrations and query builders.

pub mod db;
pub mod error;
pub mod model;
