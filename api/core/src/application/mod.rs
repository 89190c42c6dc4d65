// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod error;
pub mod env_var;
pub mod insights;

// Re-export use cases for convenience
pub use error::ServiceError;
pub use env_var::{
    EnvVarDeps, EnvVarFindService, EnvVarPermissions, EnvVarSummary, EnvVarUpdateService, EnvVarView,
    StandardEnvVarFindService, StandardEnvVarUpdateService,
};
pub use insights::{InsightsProxyService, InsightsResponse, StandardInsightsProxyService};
