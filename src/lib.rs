// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

pub mod client;
pub mod feature;
pub mod generate;
pub mod notify;
pub mod render;
pub mod settings;
pub mod stream;
