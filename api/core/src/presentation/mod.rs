// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer
//!
//! HTTP surface that translates requests into application service calls.
//! **No business logic lives here**; authorization, state checks and the
//! proxy decision all happen in `crate::application`.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Axum router and handlers for `/v3` |
//! | [`auth`] | `Authorization` header → [`crate::domain::actor::Actor`] |
//! | [`error`] | Error envelope rendering |
//! | [`representation`] | Env var JSON representations |

pub mod api;
pub mod auth;
pub mod error;
pub mod representation;
