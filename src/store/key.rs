//! Backing-store key derivation.
//!
//! Per-graph layout:
//! - `graphs::{graph}`                  graph record
//! - `graphs::{graph}::seq`             schema_id counter
//! - `graphs::{graph}::schemas`         version index (owner key)
//! - `graphs::{graph}::schemas::{uid}`  full version record (item key)

pub fn graph(graph_name: &str) -> String {
    format!("graphs::{graph_name}")
}

pub fn sequence(graph_name: &str) -> String {
    format!("graphs::{graph_name}::seq")
}

pub fn owner(graph_name: &str) -> String {
    format!("graphs::{graph_name}::schemas")
}

pub fn item(graph_name: &str, uid: &str) -> String {
    format!("graphs::{graph_name}::schemas::{uid}")
}
