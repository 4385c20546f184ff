//! Unit tests for zcp
//!
//! These tests use in-memory fakes for every port and run without network,
//! SSH or filesystem side effects.

#![allow(clippy::expect_used)]

mod architecture;
mod config_service;
mod context;
mod events;
mod import;
mod knowledge;
mod logs;
mod manage;
mod poll;
mod property_tests;
mod verify;
