//! The navigation service.
//!
//! Ties the registry, the route synthesizer and the conversation log
//! together behind the operations a transport exposes. One instance is
//! built at startup and shared by every request handler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assistant::{
    self, AudioClip, AudioDescriber, NavigationPrompt, DESTINATION, DISTANCE, NAVIGATION,
    RESPONSE, ROUTE, TIME, TRANSCRIPTION,
};
use crate::config::Config;
use crate::conversation::{ConversationEntry, ConversationLog};
use crate::error::{Error, Result};
use crate::geo::{Coordinate, RawCoordinate};
use crate::registry::{LocationRegistry, LocationSummary, NewLocation, SavedLocation};
use crate::route::{self, Route};

/// Result of saving a location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedLocation {
    /// Content-derived identifier.
    #[serde(rename = "location_id")]
    pub id: String,
    /// Shareable link that opens navigation to the place.
    pub static_url: String,
    /// The stored record.
    #[serde(rename = "location_data")]
    pub record: SavedLocation,
}

/// One row of [`LocationListing`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedLocation {
    /// Record summary.
    #[serde(flatten)]
    pub summary: LocationSummary,
    /// Shareable link.
    pub static_url: String,
}

/// All saved locations, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationListing {
    /// The locations.
    pub locations: Vec<ListedLocation>,
    /// Number of locations.
    pub total_count: usize,
}

/// A saved location prepared for automatic navigation on open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationTarget {
    /// Identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Category.
    pub category: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Always true: the client starts navigating immediately.
    pub auto_navigation: bool,
    /// When the location was saved.
    pub creation_time: DateTime<Utc>,
}

/// Input for [`NavigationService::plan_route`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Starting point; its `name` becomes the start label.
    #[serde(default)]
    pub start: Option<RawCoordinate>,
    /// End point; its `name` becomes the end label.
    #[serde(default)]
    pub end: Option<RawCoordinate>,
}

impl RouteRequest {
    /// Build a request from two raw points.
    #[must_use]
    pub fn between(start: RawCoordinate, end: RawCoordinate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

/// Reply to a navigation voice request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationReply {
    /// What the user said.
    pub transcription: String,
    /// Spoken guidance.
    pub response: String,
    /// When the exchange was logged.
    pub timestamp: DateTime<Utc>,
}

/// Reply to a main-screen voice command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandReply {
    /// What the user said.
    pub transcription: String,
    /// Spoken answer.
    pub response: String,
}

/// A route the model planned to a spoken destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoiceRoute {
    /// What the user said.
    pub transcription: String,
    /// Destination the model recognised.
    pub destination: String,
    /// Narrated directions.
    pub route: String,
    /// Walking time as stated by the model.
    pub time: String,
    /// Walking distance as stated by the model.
    pub distance: String,
}

/// Shared navigation state and operations.
#[derive(Debug)]
pub struct NavigationService {
    registry: LocationRegistry,
    conversation: ConversationLog,
    base_url: String,
    context_window: usize,
    city: String,
    fallback_position: Coordinate,
}

impl NavigationService {
    /// Build the service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured fallback position is invalid.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            registry: LocationRegistry::new(),
            conversation: ConversationLog::with_capacity(config.conversation.capacity),
            base_url: config.base_url(),
            context_window: config.conversation.context_window,
            city: config.assistant.city.clone(),
            fallback_position: config.fallback_position()?,
        })
    }

    /// The location registry.
    #[must_use]
    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    /// The conversation log.
    #[must_use]
    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    /// Shareable link for a location id.
    #[must_use]
    pub fn static_url(&self, id: &str) -> String {
        format!("{}location/{id}", self.base_url)
    }

    /// Save a location and return its id and link.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the coordinate is missing or malformed.
    pub fn create_location(
        &self,
        request: &NewLocation,
        client_origin: &str,
    ) -> Result<CreatedLocation> {
        let record = self
            .registry
            .save(request, client_origin)
            .map_err(|e| {
                warn!(error = %e, client_origin, "rejected location");
                e
            })?;
        Ok(CreatedLocation {
            id: record.id.clone(),
            static_url: self.static_url(&record.id),
            record,
        })
    }

    /// Fetch a location, counting the access.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id.
    pub fn resolve_location(&self, id: &str) -> Result<SavedLocation> {
        self.registry.get(id)
    }

    /// Fetch a location for automatic navigation, counting the access.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id.
    pub fn navigation_target(&self, id: &str) -> Result<NavigationTarget> {
        let location = self.registry.get(id)?;
        Ok(NavigationTarget {
            id: location.id,
            name: location.name,
            description: location.description,
            category: location.category,
            latitude: location.coordinate.latitude(),
            longitude: location.coordinate.longitude(),
            auto_navigation: true,
            creation_time: location.created_at,
        })
    }

    /// All saved locations with their links, newest first.
    #[must_use]
    pub fn list_locations(&self) -> LocationListing {
        let locations: Vec<ListedLocation> = self
            .registry
            .list()
            .into_iter()
            .map(|summary| ListedLocation {
                static_url: self.static_url(&summary.id),
                summary,
            })
            .collect();
        LocationListing {
            total_count: locations.len(),
            locations,
        }
    }

    /// Plan a walking route between two client-supplied points.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either point is missing or malformed.
    pub fn plan_route(&self, request: &RouteRequest) -> Result<Route> {
        let (Some(start), Some(end)) = (&request.start, &request.end) else {
            return Err(Error::validation("start and end points are required"));
        };
        let route = route::synthesize_route(
            start.validate()?,
            end.validate()?,
            start.name.as_deref(),
            end.name.as_deref(),
        );
        info!(
            distance_m = route.distance_meters,
            time_min = route.time_minutes,
            "planned route"
        );
        Ok(route)
    }

    /// Validated client position, or the configured fallback.
    ///
    /// The second element is the client position only when it was valid.
    fn position_or_fallback(
        &self,
        origin: Option<&RawCoordinate>,
    ) -> (Coordinate, Option<Coordinate>) {
        match origin.map(RawCoordinate::validate) {
            Some(Ok(position)) => (position, Some(position)),
            Some(Err(e)) => {
                warn!(error = %e, "ignoring malformed client position");
                (self.fallback_position, None)
            }
            None => (self.fallback_position, None),
        }
    }

    /// Answer a navigation question asked by voice and log the exchange.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty clip and
    /// [`Error::Assistant`] if the model fails. Nothing is logged on error.
    pub async fn voice_navigation(
        &self,
        describer: &dyn AudioDescriber,
        clip: &AudioClip,
        origin: Option<&RawCoordinate>,
        destination: Option<&str>,
    ) -> Result<NavigationReply> {
        let (position, origin) = self.position_or_fallback(origin);
        let destination = destination.map(str::trim).filter(|d| !d.is_empty());
        let context = self.conversation.recent_context(self.context_window);

        let prompt = NavigationPrompt {
            city: &self.city,
            position,
            destination,
            context: &context,
        }
        .render();

        let text = assistant::ask(describer, &prompt, clip).await?;
        let (transcription, response) =
            assistant::parse_exchange(&text, NAVIGATION, "Audio processed");

        let entry = ConversationEntry::new(transcription.clone(), response.clone())
            .with_origin(origin)
            .with_destination(destination.map(str::to_string));
        let timestamp = entry.timestamp;
        self.conversation.append(entry);

        info!(%transcription, "voice navigation exchange");
        Ok(NavigationReply {
            transcription,
            response,
            timestamp,
        })
    }

    /// Interpret a main-screen voice command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty clip and
    /// [`Error::Assistant`] if the model fails.
    pub async fn voice_command(
        &self,
        describer: &dyn AudioDescriber,
        clip: &AudioClip,
    ) -> Result<CommandReply> {
        let text = assistant::ask(describer, &assistant::command_prompt(), clip).await?;
        let (transcription, response) =
            assistant::parse_exchange(&text, RESPONSE, "Command processed");
        Ok(CommandReply {
            transcription,
            response,
        })
    }

    /// Have the model plan a route to a destination named by voice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty clip and
    /// [`Error::Assistant`] if the model fails.
    pub async fn voice_route(
        &self,
        describer: &dyn AudioDescriber,
        clip: &AudioClip,
        origin: Option<&RawCoordinate>,
    ) -> Result<VoiceRoute> {
        let (position, _) = self.position_or_fallback(origin);
        let prompt = assistant::voice_route_prompt(&self.city, position);
        let text = assistant::ask(describer, &prompt, clip).await?;

        let mut sections = assistant::parse_sections(
            &text,
            &[TRANSCRIPTION, DESTINATION, ROUTE, TIME, DISTANCE],
        )
        .into_iter();
        let mut next = || sections.next().unwrap_or_default();
        Ok(VoiceRoute {
            transcription: next(),
            destination: next(),
            route: next(),
            time: next(),
            distance: next(),
        })
    }
}
