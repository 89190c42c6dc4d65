// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod repositories;
pub mod cipher;
pub mod insights_client;
pub mod seed;

pub use cipher::AesGcmCipher;
pub use insights_client::HttpInsightsClient;
pub use repositories::InMemoryStores;
