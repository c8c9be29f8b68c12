//! Temperature observation server.
//!
//! A small HTTP API over a single `;`-delimited CSV of monthly
//! temperature readings per weather station: station listing, monthly
//! series, annual means and summary statistics over a station/year window.

pub mod config;
pub mod dataset;
pub mod web;
