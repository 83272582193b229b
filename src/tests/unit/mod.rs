//! Service-level scenarios over the in-memory store

mod catalog_scenarios;
mod clients;
mod payments;
mod sessions;
