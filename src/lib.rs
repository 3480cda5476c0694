//! A client-side EWMH/ICCCM adapter for X11 desktops.
//!
//! The crate wraps an [`x11rb`] connection in a [`connection::DesktopHandler`]
//! that resolves the protocol atoms once, probes the optional extensions, and
//! exposes the desktop through three traits: [`connection::DesktopQueryExt`]
//! for root-window state, [`connection::WindowQueryExt`] for per-window state,
//! and [`connection::WmRequestExt`] for best-effort requests to the window
//! manager.
#![warn(clippy::correctness)]
#![warn(clippy::suspicious)]
#![warn(clippy::complexity)]
#![warn(clippy::perf)]
#![warn(clippy::style)]
// #![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
// #![warn(clippy::restriction)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]

pub mod atoms;
pub mod class;
pub mod config;
pub mod connection;
pub mod extensions;
pub mod geometry;
pub mod state;
