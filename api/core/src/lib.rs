// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # CI API Core
//!
//! Decision core behind two `/v3` endpoints of the CI API: updating a
//! repository's encrypted env vars and proxying insights metrics requests.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Authorization policy, settings mutation, insights proxying

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
