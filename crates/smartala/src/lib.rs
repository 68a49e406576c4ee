//! `smartala` - the navigation core of a voice-driven pedestrian assistant
//!
//! This library provides deterministic walking-route synthesis from raw
//! coordinates, a shared registry of saved places with content-derived
//! identifiers, and the bounded conversation history handed to the
//! language model that does transcription and narration.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod assistant;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod geo;
pub mod logging;
pub mod registry;
pub mod route;
pub mod server;
pub mod service;

pub use config::Config;
pub use conversation::{ConversationEntry, ConversationLog};
pub use error::{Error, Result};
pub use geo::{bearing_degrees, classify_direction, distance_meters, Coordinate, Direction};
pub use logging::init_logging;
pub use registry::{LocationRegistry, LocationSummary, NewLocation, SavedLocation};
pub use route::{synthesize_route, Route, RouteStep, StepKind};
pub use service::NavigationService;
