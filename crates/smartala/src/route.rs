//! Walking route synthesis.
//!
//! Builds a plausible pedestrian itinerary between two points without a
//! street graph. Total distance and walking time come from the geometry
//! alone; the steps are narration, generated by a generator seeded from
//! the coordinates so the same request always yields the same text.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::{self, Coordinate, Direction};

/// Assumed pedestrian speed.
pub const WALKING_SPEED_KMH: f64 = 5.0;

/// Routes longer than this get a mid-route continue step.
pub const CONTINUE_THRESHOLD_M: u64 = 300;

/// Routes longer than this get a landmark continue step.
pub const LANDMARK_THRESHOLD_M: u64 = 600;

/// Routes longer than this get an approach step.
pub const APPROACH_THRESHOLD_M: u64 = 200;

/// Distance before arrival at which the approach step is announced.
pub const APPROACH_MARKER_M: u64 = 100;

/// Street pool; the first half are main avenues, the second half cross streets.
pub const STREETS: [&str; 12] = [
    "Abay Avenue",
    "Satpayev Street",
    "Al-Farabi Avenue",
    "Tole Bi Street",
    "Nazarbayev Avenue",
    "Zhibek Zholy Street",
    "Dostyk Avenue",
    "Manas Street",
    "Bogenbai Batyr Street",
    "Raiymbek Avenue",
    "Kurmangazy Street",
    "Kabanbai Batyr Street",
];

/// Landmarks used to anchor the second continue step.
pub const LANDMARKS: [&str; 4] = ["traffic light", "bus stop", "shopping mall", "park"];

/// Final manoeuvres announced by the approach step.
pub const FINAL_TURNS: [&str; 3] = ["turn right", "turn left", "continue straight"];

const DEFAULT_START_LABEL: &str = "Starting point";
const DEFAULT_END_LABEL: &str = "Destination";

/// Role of a step within a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// First step, naming the street to head for.
    Start,
    /// Walk along a street or toward a landmark.
    Continue,
    /// Final manoeuvre shortly before arrival.
    Approach,
    /// Arrival.
    Finish,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Continue => write!(f, "continue"),
            Self::Approach => write!(f, "approach"),
            Self::Finish => write!(f, "finish"),
        }
    }
}

/// One narrated instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    /// Spoken instruction.
    pub instruction: String,
    /// Distance covered by this step, e.g. `"150 m"`.
    pub distance: String,
    /// Distance covered by this step in metres.
    pub distance_meters: u64,
    /// Route bearing in degrees.
    pub bearing: f64,
    /// Step role.
    #[serde(rename = "type")]
    pub kind: StepKind,
}

impl RouteStep {
    fn new(instruction: String, distance_meters: u64, bearing: f64, kind: StepKind) -> Self {
        Self {
            instruction,
            distance: format!("{distance_meters} m"),
            distance_meters,
            bearing,
            kind,
        }
    }
}

/// A labelled route endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Position.
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// Human label.
    pub description: String,
}

/// A synthesized walking route.
///
/// `distance_meters` and `time_minutes` are derived from the endpoints only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Where the walk begins.
    pub start: Waypoint,
    /// Where the walk ends.
    pub end: Waypoint,
    /// Ordered narration.
    pub steps: Vec<RouteStep>,
    /// Total distance label, metres below 1 km.
    pub total_distance: String,
    /// Walking time label.
    pub estimated_time: String,
    /// Total distance in whole metres.
    pub distance_meters: u64,
    /// Walking time in whole minutes.
    pub time_minutes: u64,
}

/// Synthesize a route between two points.
///
/// Labels default to `"Starting point"` and `"Destination"`.
#[must_use]
pub fn synthesize_route(
    start: Coordinate,
    end: Coordinate,
    start_label: Option<&str>,
    end_label: Option<&str>,
) -> Route {
    let distance_km = geo::distance_km(start, end);
    let distance_m = whole_meters(distance_km);
    let time_hours = distance_km / WALKING_SPEED_KMH;
    let time_minutes = whole_minutes(time_hours);

    let steps = generate_steps(start, end, distance_m);

    debug!(
        distance_m,
        time_minutes,
        steps = steps.len(),
        "synthesized route"
    );

    Route {
        start: Waypoint {
            coordinate: start,
            description: label_or(start_label, DEFAULT_START_LABEL),
        },
        end: Waypoint {
            coordinate: end,
            description: label_or(end_label, DEFAULT_END_LABEL),
        },
        steps,
        total_distance: format_distance(distance_m, distance_km),
        estimated_time: format_duration(time_minutes),
        distance_meters: distance_m,
        time_minutes,
    }
}

/// Generate the step narration for a route of `distance_m` metres.
///
/// The distance is passed in rather than recomputed so the thresholds can
/// be exercised directly; the generator is still seeded from the coordinates.
#[must_use]
pub fn generate_steps(start: Coordinate, end: Coordinate, distance_m: u64) -> Vec<RouteStep> {
    let bearing = geo::bearing_degrees(start, end);
    let direction = Direction::classify(bearing);

    let mut rng = ChaCha8Rng::seed_from_u64(route_seed(start, end));
    let (main_streets, cross_streets) = STREETS.split_at(STREETS.len() / 2);
    let main_street = pick(&mut rng, main_streets);
    let cross_street = pick(&mut rng, cross_streets);

    let mut steps = Vec::with_capacity(5);
    steps.push(RouteStep::new(
        format!("Head out onto {main_street} and turn {direction}"),
        0,
        bearing,
        StepKind::Start,
    ));

    if distance_m > CONTINUE_THRESHOLD_M {
        let third = distance_m / 3;
        steps.push(RouteStep::new(
            format!(
                "Walk straight along {main_street} for {third} meters to the intersection with {cross_street}"
            ),
            third,
            bearing,
            StepKind::Continue,
        ));

        if distance_m > LANDMARK_THRESHOLD_M {
            let landmark = pick(&mut rng, &LANDMARKS);
            steps.push(RouteStep::new(
                format!("Keep going until the {landmark}, follow the sound of traffic"),
                distance_m - 2 * third,
                bearing,
                StepKind::Continue,
            ));
        }
    }

    if distance_m > APPROACH_THRESHOLD_M {
        let final_turn = pick(&mut rng, &FINAL_TURNS);
        steps.push(RouteStep::new(
            format!(
                "In {APPROACH_MARKER_M} meters {final_turn}, the destination will be on your right"
            ),
            APPROACH_MARKER_M,
            bearing,
            StepKind::Approach,
        ));
    }

    steps.push(RouteStep::new(
        "You have arrived at your destination. Congratulations!".to_string(),
        0,
        bearing,
        StepKind::Finish,
    ));

    steps
}

/// Seed derived from the four coordinate values, scaled by 1000 and truncated.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn route_seed(start: Coordinate, end: Coordinate) -> u64 {
    let sum = start.latitude() + end.latitude() + start.longitude() + end.longitude();
    // sign bits are kept: negative sums map to distinct seeds
    ((sum * 1000.0) as i64) as u64
}

fn pick<'a>(rng: &mut ChaCha8Rng, pool: &[&'a str]) -> &'a str {
    pool[rng.gen_range(0..pool.len())]
}

fn label_or(label: Option<&str>, default: &str) -> String {
    match label.map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => default.to_string(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_meters(distance_km: f64) -> u64 {
    (distance_km * 1000.0) as u64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_minutes(time_hours: f64) -> u64 {
    (time_hours * 60.0) as u64
}

/// Format a total distance: whole metres below 1 km, else km to one decimal.
#[must_use]
pub fn format_distance(distance_m: u64, distance_km: f64) -> String {
    if distance_m < 1000 {
        format!("{distance_m} m")
    } else {
        format!("{distance_km:.1} km")
    }
}

/// Format a walking time: minutes below one hour, else hours and minutes.
#[must_use]
pub fn format_duration(minutes: u64) -> String {
    if minutes < 60 {
        format!("{minutes} min")
    } else {
        format!("{} h {} min", minutes / 60, minutes % 60)
    }
}
