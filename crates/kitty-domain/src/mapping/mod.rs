//! Conversion between UI-shaped records (camelCase) and backend records
//! (snake_case), driven by explicit mapping tables.

mod case;
mod schema;
pub mod schemas;

pub use case::{camelize, camelize_keys, decamelize, decamelize_keys};
pub use schema::{Direction, FieldRule, FieldSchema, FieldSchemaBuilder, FieldTransform};
