//! Product catalog library.
//!
//! Create, list, fetch, update and soft-delete product records backed by
//! `PostgreSQL`. Removed products keep their row but are invisible to every
//! read and write path.
//!
//! This crate provides the service as a library, allowing it to be tested
//! and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;
