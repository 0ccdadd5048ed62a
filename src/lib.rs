//! # Graphloom
//!
//! A schema registry for federated GraphQL services, usable both as a
//! standalone binary and as a library. Services push versions of their SDL
//! documents; the registry stores them content-addressed per graph, diffs
//! revisions structurally with breaking-change classification, and composes
//! all active fragments into one validated unified schema.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use graphloom::registry::SchemaStore;
//! use graphloom::server::{AppState, create_router};
//! use graphloom::store::SqliteKv;
//!
//! let kv = SqliteKv::new("./data/graphloom.db").unwrap();
//! kv.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(SchemaStore::new(Arc::new(kv))));
//! let router = create_router(state);
//! // Serve with axum...
//! ```

pub mod compose;
pub mod config;
pub mod diff;
pub mod error;
pub mod registry;
pub mod server;
pub mod store;
pub mod types;
