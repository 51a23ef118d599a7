// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Startup wiring for the `rsv-server` binary: logging, store bootstrap and
//! the maintenance commands.

pub mod commands;
pub mod logging;
pub mod version;

pub use commands::{database_settings, open_tables, run_init, run_tables};
pub use logging::init_tracing;
