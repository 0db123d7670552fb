//! This crate contains the document codec shared by the other crates in this workspace.

pub mod yaml;
