// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

// Endpoint handlers, mounted by the HTTP transport

pub mod health;
pub mod structural;
