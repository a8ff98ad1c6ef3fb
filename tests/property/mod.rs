// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! This module contains property-based tests using proptest to verify
//! lifecycle invariants of the registration aggregate.

mod registration_invariants;
