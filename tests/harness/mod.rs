// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for gateway attack simulation.
//!
//! This module provides utilities for simulating hostile traffic against
//! the gateway router to validate admission and authentication controls.

pub mod attacks;
pub mod generators;
pub mod metrics;
