/*
 * mod.rs
 * Copyright (c) 2025 Poly-Bench Contributors
 *
 * Command implementations for the poly-bench CLI.
 */

pub mod check;
