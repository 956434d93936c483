//! # startit-watch
//!
//! Watches a startit.rs job search and emails when postings appear or
//! disappear.
//!
//! Each run is one scrape cycle: the listing page is fetched, its postings
//! are extracted from three tiers of markup, and the result is reconciled
//! against the jobs stored by the previous run.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌──────────┐
//! │ validate │──▶│  fetch   │──▶│  extract  │──▶│reconcile │
//! │   URL    │   │ reqwest  │   │ 3 shapes  │   │ new/gone │
//! └──────────┘   └──────────┘   └───────────┘   └────┬─────┘
//!                                                    │
//!                              ┌─────────────────────┤
//!                              ▼                     ▼
//!                        ┌──────────┐          ┌──────────┐
//!                        │  SQLite  │          │  notify  │
//!                        │  store   │          │  (SMTP)  │
//!                        └──────────┘          └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! startit init
//! startit scrape https://startit.rs/poslovi/pretraga/python/
//! startit jobs https://startit.rs/poslovi/pretraga/python/ --all
//! startit extract saved-page.html
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Core error kinds |
//! | [`validate`] | Search URL validation |
//! | [`extract`] | Posting partition and extraction |
//! | [`reconcile`] | New/expired computation |
//! | [`store`] | Job store trait, SQLite and in-memory backends |
//! | [`fetch`] | Page fetching |
//! | [`notify`] | Message composition and delivery |
//! | [`cycle`] | Scrape cycle orchestration |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod config;
pub mod cycle;
pub mod db;
pub mod error;
pub mod extract;
pub mod extract_cmd;
pub mod fetch;
pub mod jobs;
pub mod migrate;
pub mod models;
pub mod notify;
pub mod reconcile;
pub mod store;
pub mod validate;
