// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Recap chat summarizer.
//!
//! Serves a public health check and bearer-protected admin routes over the
//! shared message store.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{GatewayState, router, serve};
