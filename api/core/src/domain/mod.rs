// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain Layer
//!
//! Entities, value objects and pure decision logic. Nothing in here performs
//! I/O; persistence and encryption are reached through the traits in
//! [`repository`] and [`cipher`].
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Authorization rules, repository state, env-var settings

pub mod actor;
pub mod permission;
pub mod repo;
pub mod env_var;
pub mod settings;
pub mod insights;
pub mod policy;
pub mod repository;
pub mod cipher;
pub mod api_config;
