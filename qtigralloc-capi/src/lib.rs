// Copyright 2024 Google LLC
// SPDX-License-Identifier: MIT

#![warn(missing_docs)]

//! A C API for vendor buffer metadata.
//!
//! This crate provides `qtigralloc_get` and `qtigralloc_set` for C and C++ clients.  The mapper
//! service is loaded on first use through `qtigralloc_load_mapper`, which the integrator provides.

pub mod capi;
mod log;
