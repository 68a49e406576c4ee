//! Property-based tests for the geometry and route synthesis.
//!
//! Distance must be symmetric and zero on identical points, bearings must
//! stay within `[0, 360)`, and a route must be a pure function of its
//! endpoints.

use proptest::prelude::*;
use smartala::route::{generate_steps, StepKind};
use smartala::{bearing_degrees, classify_direction, distance_meters, synthesize_route, Coordinate, Direction};

// ============================================================================
// Strategies
// ============================================================================

fn arb_coordinate() -> impl Strategy<Value = Coordinate> {
    (-90.0f64..=90.0, -180.0f64..=180.0)
        .prop_map(|(lat, lng)| Coordinate::new(lat, lng).expect("in range"))
}

/// Points within a few kilometres of central Almaty.
fn arb_city_coordinate() -> impl Strategy<Value = Coordinate> {
    (43.20f64..43.30, 76.85f64..76.98)
        .prop_map(|(lat, lng)| Coordinate::new(lat, lng).expect("in range"))
}

// ============================================================================
// Geometry
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn distance_is_symmetric(a in arb_coordinate(), b in arb_coordinate()) {
        prop_assert_eq!(distance_meters(a, b), distance_meters(b, a));
    }

    #[test]
    fn distance_to_self_is_zero(a in arb_coordinate()) {
        prop_assert_eq!(distance_meters(a, a), 0.0);
    }

    #[test]
    fn distance_is_bounded_by_half_circumference(a in arb_coordinate(), b in arb_coordinate()) {
        let d = distance_meters(a, b);
        prop_assert!(d >= 0.0);
        prop_assert!(d <= std::f64::consts::PI * 6_371_000.0 + 1.0);
    }

    #[test]
    fn bearing_is_in_range(a in arb_coordinate(), b in arb_coordinate()) {
        let bearing = bearing_degrees(a, b);
        prop_assert!((0.0..360.0).contains(&bearing), "bearing {}", bearing);
        prop_assert_ne!(classify_direction(bearing), Direction::Ahead);
    }
}

// ============================================================================
// Route synthesis
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn route_is_deterministic(a in arb_city_coordinate(), b in arb_city_coordinate()) {
        let first = synthesize_route(a, b, Some("A"), Some("B"));
        let second = synthesize_route(a, b, Some("A"), Some("B"));
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn route_totals_match_geometry(a in arb_city_coordinate(), b in arb_city_coordinate()) {
        let route = synthesize_route(a, b, None, None);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let expected = distance_meters(a, b) as u64;
        prop_assert_eq!(route.distance_meters, expected);
    }

    #[test]
    fn step_count_follows_thresholds(
        a in arb_city_coordinate(),
        b in arb_city_coordinate(),
        d in 0u64..5000,
    ) {
        let steps = generate_steps(a, b, d);
        let expected = 2 + usize::from(d > 200) + usize::from(d > 300) + usize::from(d > 600);
        prop_assert_eq!(steps.len(), expected);
        prop_assert_eq!(steps.first().map(|s| s.kind), Some(StepKind::Start));
        prop_assert_eq!(steps.last().map(|s| s.kind), Some(StepKind::Finish));
    }
}
