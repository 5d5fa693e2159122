//! # Core Navigation Logic
//!
//! This module contains lexnav's navigation engine.
//! It knows nothing about any specific view technology or volume format.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Navigator (control)  │
//!                    │  • History (frames)     │
//!                    │  • Resolver / Follower  │
//!                    │                         │
//!                    └─────┬─────────────┬─────┘
//!                          │             │
//!              ViewEvent   ▼             ▼  VolumeProvider
//!                   ┌────────────┐  ┌────────────┐
//!                   │ Presenter  │  │  Volumes   │
//!                   │ (stdout,   │  │  (json,    │
//!                   │  webview)  │  │   ...)     │
//!                   └────────────┘  └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`model`]: `Entry` and `Article`
//! - [`history`]: the back stack and its disambiguation frames
//! - [`resolver`]: entry → article, following redirects
//! - [`follower`]: link text → candidate entries
//! - [`navigator`]: single-flight controller tying it all together
//! - [`present`]: events sent to the view
//! - [`config`]: layered settings

pub mod config;
pub mod follower;
pub mod history;
pub mod model;
pub mod navigator;
pub mod present;
pub mod resolver;

pub use model::{Article, Entry};
pub use navigator::{Dispatch, NavState, Navigator, NavigatorConfig};
pub use present::{Presenter, ViewEvent};
