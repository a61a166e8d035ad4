//! Nông Sản Core - Shared types library.
//!
//! This crate provides the types shared by every Nông Sản component:
//! - `client` - REST services, stores and session bootstrap
//! - `cli` - Command-line front end over the client
//!
//! # Architecture
//!
//! The core crate contains only types, lookup tables and pure validation -
//! no HTTP clients and no storage. The DTOs mirror the marketplace backend
//! responses field for field (camelCase on the wire).
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, statuses, roles, VND amounts and emails
//! - [`dto`] - Request/response records for every backend area
//! - [`api_code`] - Backend result codes mapped to Vietnamese messages
//! - [`validation`] - Login, register and market price form rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api_code;
pub mod dto;
pub mod types;
pub mod validation;

pub use types::*;
