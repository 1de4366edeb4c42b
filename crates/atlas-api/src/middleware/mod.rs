// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

// Middleware for HTTP requests

pub mod cors;
