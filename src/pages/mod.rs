//! Page views mounted by routes.

pub mod blocks;
