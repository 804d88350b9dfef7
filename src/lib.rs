//! # blocks-route
//!
//! Client-side `/blocks` route: a loader that concurrently ensures three
//! queries (block types, block documents, block document count) are in a
//! shared query cache, and a page that renders from that cache once the
//! loader has settled.
//!
//! `query` is the cache, `api` the remote block endpoints and their query
//! descriptors, `router` the route table and navigation, `routes` and `pages`
//! the application's routes and views.

pub mod api;
pub mod config;
pub mod error;
pub mod pages;
pub mod query;
pub mod router;
pub mod routes;
