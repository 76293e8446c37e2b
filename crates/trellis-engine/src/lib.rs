//! Trellis engine - dependency-graph status and layout computation.
//!
//! This crate is the algorithmic core of trellis: given an immutable
//! project snapshot (nodes, edges, requests) it derives every node's
//! effective status, explains blocking chains, computes a deterministic
//! grid layout, and runs the unblock notification cascade when a node
//! completes. It owns no storage and no transport; callers supply
//! snapshots and a notification sink.
//!
//! The compute functions are pure: they never mutate their input, never
//! cache between calls, and return identical output for identical
//! snapshots, so they can run concurrently without coordination.

#![forbid(unsafe_code)]

pub mod cascade;
pub mod diagnose;
pub mod domain;
pub mod error;
pub mod layout;
pub mod snapshot;
pub mod status;
