pub mod batch;
pub mod config;
pub mod predict;
pub mod time_expr;
pub mod web;
