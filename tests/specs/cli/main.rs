// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Black-box specs for the `ferryd` binary.

mod cache;
mod common;
mod errors;
mod help;
mod sync;
