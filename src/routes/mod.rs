//! Application route table.
//!
//! Each route module exposes a `route()` constructor; `route_table` collects
//! them once at startup.

pub mod blocks;

use std::sync::Arc;

use crate::api::BlocksApi;
use crate::router::{RouteTable, RouteTableError};

/// Build the application's route table.
///
/// # Errors
///
/// Returns [`RouteTableError`] if two routes claim the same path.
pub fn route_table(api: &Arc<dyn BlocksApi>) -> Result<RouteTable, RouteTableError> {
    RouteTable::builder().route(blocks::route(api)).build()
}
