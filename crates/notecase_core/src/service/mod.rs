//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate gateway calls into use-case level APIs.
//! - Keep UI/CLI layers decoupled from storage details.

pub mod board_service;
pub mod transfer_service;
