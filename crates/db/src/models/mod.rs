//! Row structs and their conversion into `yarning-core` domain types.
//!
//! Status columns are stored as TEXT and decoded with the core enums'
//! `FromStr` impls; a value that does not decode is a corrupt row.

pub mod advisor;
pub mod consultation;
pub mod workflow_stage;

use std::str::FromStr;

use yarning_core::error::CoreError;
use yarning_core::store::StoreError;

fn decode<T>(column: &str, value: &str) -> Result<T, StoreError>
where
    T: FromStr<Err = CoreError>,
{
    value
        .parse()
        .map_err(|e: CoreError| StoreError::Corrupt(format!("{column}: {e}")))
}
