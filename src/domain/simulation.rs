// Simulation state - the mower's evolving battery and coverage counters
use super::reading::{round_to, Metrics, Reading, OBSTACLE_ERROR_CODE};
use super::sampler::Sampler;
use chrono::{DateTime, Utc};
use std::ops::Range;

pub const FULL_BATTERY: f64 = 100.0;

// Below this the battery counts as empty; absorbs float drift from repeated subtraction.
const DRAINED_EPSILON: f64 = 1e-6;

const PROXIMITY_RANGE: Range<f64> = 0.0..2.0;
const POWER_USAGE_RANGE: Range<f64> = 50.0..60.0;
const BLADE_RPM_RANGE: Range<f64> = 3000.0..3500.0;
const SPEED_RANGE: Range<f64> = 0.0..2.0;
const GRASS_HEIGHT_RANGE: Range<f64> = 5.0..7.0;

/// Tunable parameters of the generator
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationProfile {
    pub obstacle_threshold_m: f64,
    pub battery_drain: Range<f64>,
    pub area_increment_max: f64,
}

impl Default for SimulationProfile {
    fn default() -> Self {
        Self {
            obstacle_threshold_m: 0.5,
            battery_drain: 0.1..0.6,
            area_increment_max: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    battery_level: f64,
    area_covered: f64,
    last_timestamp: Option<DateTime<Utc>>,
}

/// Result of advancing the state by one tick
#[derive(Debug, Clone)]
pub struct Step {
    pub reading: Reading,
    /// The battery emptied on this tick and the counters were reset afterwards
    pub drained: bool,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationState {
    pub fn new() -> Self {
        Self {
            battery_level: FULL_BATTERY,
            area_covered: 0.0,
            last_timestamp: None,
        }
    }

    pub fn battery_level(&self) -> f64 {
        self.battery_level
    }

    pub fn area_covered(&self) -> f64 {
        self.area_covered
    }

    /// Advance one tick and build the reading describing it.
    ///
    /// The reading of the tick that empties the battery still reports the
    /// drained values; the reset to a full battery and zero area applies to
    /// the tick after it.
    pub fn advance(
        &mut self,
        profile: &SimulationProfile,
        sampler: &mut dyn Sampler,
        now: DateTime<Utc>,
    ) -> Step {
        let proximity_front = round_to(sampler.uniform(PROXIMITY_RANGE), 2);
        let proximity_rear = round_to(sampler.uniform(PROXIMITY_RANGE), 2);
        let obstacle_detected = proximity_front < profile.obstacle_threshold_m
            || proximity_rear < profile.obstacle_threshold_m;
        let error_state = obstacle_detected.then(|| OBSTACLE_ERROR_CODE.to_string());

        let drain = sampler.uniform(profile.battery_drain.clone());
        self.battery_level = (self.battery_level - drain).max(0.0);
        if self.battery_level < DRAINED_EPSILON {
            self.battery_level = 0.0;
        }
        let drained = self.battery_level == 0.0;

        if !obstacle_detected && !drained {
            self.area_covered += sampler.uniform(0.0..profile.area_increment_max);
        }

        let metrics = Metrics {
            battery_level: round_to(self.battery_level, 1),
            current_power_usage: sampler.uniform(POWER_USAGE_RANGE),
            cutting_blade_rpm: sampler.uniform(BLADE_RPM_RANGE).floor() as u32,
            speed: round_to(sampler.uniform(SPEED_RANGE), 2),
            grass_height: (sampler.uniform(GRASS_HEIGHT_RANGE) * 10.0).floor() / 10.0,
            area_covered: round_to(self.area_covered, 1),
            proximity_front,
            proximity_rear,
            obstacle_detected,
            error_state,
        };

        let timestamp = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(timestamp);

        if drained {
            self.battery_level = FULL_BATTERY;
            self.area_covered = 0.0;
        }

        Step {
            reading: Reading::new(timestamp, metrics),
            drained,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sampler::{FixedSampler, RandomSampler};
    use chrono::Duration;

    fn fixed_drain_profile(drain: f64) -> SimulationProfile {
        SimulationProfile {
            battery_drain: drain..drain,
            ..SimulationProfile::default()
        }
    }

    #[test]
    fn test_initial_state() {
        let state = SimulationState::new();
        assert_eq!(state.battery_level(), 100.0);
        assert_eq!(state.area_covered(), 0.0);
    }

    #[test]
    fn test_ranges_hold_for_random_ticks() {
        let profile = SimulationProfile::default();
        let mut sampler = RandomSampler::seeded(11);
        let mut state = SimulationState::new();

        for _ in 0..2000 {
            let m = state.advance(&profile, &mut sampler, Utc::now()).reading.metrics;
            assert!((0.0..=100.0).contains(&m.battery_level));
            assert!(m.area_covered >= 0.0);
            assert!((50.0..60.0).contains(&m.current_power_usage));
            assert!((3000..3500).contains(&m.cutting_blade_rpm));
            assert!((0.0..=2.0).contains(&m.speed));
            assert!((5.0..7.0).contains(&m.grass_height));
            assert!((0.0..=2.0).contains(&m.proximity_front));
            assert!((0.0..=2.0).contains(&m.proximity_rear));
            assert!((0.0..=100.0).contains(&state.battery_level()));
            assert!(state.area_covered() >= 0.0);
        }
    }

    #[test]
    fn test_obstacle_and_error_state_agree() {
        let profile = SimulationProfile::default();
        let mut sampler = RandomSampler::seeded(3);
        let mut state = SimulationState::new();
        let mut seen_obstacle = false;

        for _ in 0..500 {
            let m = state.advance(&profile, &mut sampler, Utc::now()).reading.metrics;
            let expected = m.proximity_front < 0.5 || m.proximity_rear < 0.5;
            assert_eq!(m.obstacle_detected, expected);
            assert_eq!(m.error_state.is_some(), m.obstacle_detected);
            if m.obstacle_detected {
                seen_obstacle = true;
                assert_eq!(m.error_state.as_deref(), Some(OBSTACLE_ERROR_CODE));
            }
        }
        assert!(seen_obstacle);
    }

    #[test]
    fn test_monotonic_until_reset() {
        let profile = SimulationProfile::default();
        let mut sampler = RandomSampler::seeded(99);
        let mut state = SimulationState::new();
        let mut previous: Option<Metrics> = None;

        for _ in 0..1000 {
            let step = state.advance(&profile, &mut sampler, Utc::now());
            let m = step.reading.metrics;
            if let Some(prev) = &previous {
                assert!(m.battery_level <= prev.battery_level);
                assert!(m.area_covered >= prev.area_covered);
                if m.obstacle_detected {
                    assert_eq!(m.area_covered, prev.area_covered);
                }
            }
            previous = if step.drained { None } else { Some(m) };
        }
    }

    #[test]
    fn test_obstacle_freezes_area() {
        // Fraction 0.1 puts both proximity sensors at 0.2 m
        let profile = SimulationProfile::default();
        let mut sampler = FixedSampler::new(0.1);
        let mut state = SimulationState::new();

        for _ in 0..10 {
            let m = state.advance(&profile, &mut sampler, Utc::now()).reading.metrics;
            assert!(m.obstacle_detected);
            assert_eq!(m.area_covered, 0.0);
        }
        assert_eq!(state.area_covered(), 0.0);
    }

    #[test]
    fn test_drain_reset_after_250_ticks() {
        let profile = fixed_drain_profile(0.4);
        let mut sampler = FixedSampler::new(0.6);
        let mut state = SimulationState::new();

        for tick in 1..=249 {
            let step = state.advance(&profile, &mut sampler, Utc::now());
            assert!(!step.drained, "drained early at tick {tick}");
        }

        let boundary = state.advance(&profile, &mut sampler, Utc::now());
        assert!(boundary.drained);
        assert_eq!(boundary.reading.metrics.battery_level, 0.0);
        assert_eq!(state.battery_level(), 100.0);
        assert_eq!(state.area_covered(), 0.0);

        let next = state.advance(&profile, &mut sampler, Utc::now());
        assert!(!next.drained);
        assert_eq!(next.reading.metrics.battery_level, 99.6);
        assert!(next.reading.metrics.area_covered <= 0.5);
    }

    #[test]
    fn test_boundary_reading_keeps_pre_reset_area() {
        let profile = fixed_drain_profile(50.0);
        let mut sampler = FixedSampler::new(0.6);
        let mut state = SimulationState::new();

        let first = state.advance(&profile, &mut sampler, Utc::now());
        assert_eq!(first.reading.metrics.battery_level, 50.0);
        assert_eq!(first.reading.metrics.area_covered, 0.3);

        let boundary = state.advance(&profile, &mut sampler, Utc::now());
        assert!(boundary.drained);
        assert_eq!(boundary.reading.metrics.battery_level, 0.0);
        assert_eq!(boundary.reading.metrics.area_covered, 0.3);
    }

    #[test]
    fn test_timestamps_never_go_backwards() {
        let profile = SimulationProfile::default();
        let mut sampler = RandomSampler::seeded(5);
        let mut state = SimulationState::new();
        let now = Utc::now();

        let first = state.advance(&profile, &mut sampler, now).reading;
        let second = state
            .advance(&profile, &mut sampler, now - Duration::seconds(30))
            .reading;
        assert_eq!(second.timestamp, first.timestamp);

        let third = state
            .advance(&profile, &mut sampler, now + Duration::seconds(5))
            .reading;
        assert!(third.timestamp > second.timestamp);
    }
}
