//! Animated traversal of a route.
//!
//! Everything here is sampled: the caller passes the current [`Instant`] on
//! every display refresh and reads back the progress and geometry. Nothing
//! runs in the background.

use std::time::{Duration, Instant};

use model::{route::RouteModel, stop::RouteStop};
use serde::Serialize;
use utility::geo::Point;

/// Fraction of `duration` covered by `elapsed`, capped at 1. A zero duration
/// is always complete.
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

/// [`progress`] between two timestamps. A `now` before `start` counts as no
/// time elapsed.
pub fn progress_between(start: Instant, now: Instant, duration: Duration) -> f64 {
    progress(now.saturating_duration_since(start), duration)
}

fn clamp(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

/// Where along the stop sequence a given progress lands.
struct Cursor {
    /// The last stop already passed.
    index: usize,
    /// How far towards `index + 1`, in `[0, 1)`.
    fraction: f64,
}

impl Cursor {
    fn new(stop_count: usize, progress: f64) -> Option<Self> {
        let last = stop_count.checked_sub(1)?;
        let position = clamp(progress) * last as f64;
        let index = (position.floor() as usize).min(last);
        Some(Self {
            index,
            fraction: if index < last {
                position - index as f64
            } else {
                0.0
            },
        })
    }

    fn between(&self, stops: &[RouteStop]) -> Option<Point> {
        if self.fraction <= 0.0 {
            return None;
        }
        let from = stops.get(self.index)?.position();
        let to = stops.get(self.index + 1)?.position();
        Some(from.lerp(&to, self.fraction))
    }
}

/// The part of the route walked at `progress`: every passed stop, plus an
/// interpolated point on the current leg when the picker is between stops.
pub fn partial_path(stops: &[RouteStop], progress: f64) -> Vec<Point> {
    let Some(cursor) = Cursor::new(stops.len(), progress) else {
        return vec![];
    };

    let mut path = stops[..=cursor.index]
        .iter()
        .map(RouteStop::position)
        .collect::<Vec<_>>();
    path.extend(cursor.between(stops));
    path
}

/// The picker marker at `progress`. `None` for an empty route.
pub fn current_position(stops: &[RouteStop], progress: f64) -> Option<Point> {
    let cursor = Cursor::new(stops.len(), progress)?;
    cursor
        .between(stops)
        .or_else(|| stops.get(cursor.index).map(RouteStop::position))
}

/// Whether stop `index` of `stop_count` stops has been reached at `progress`.
/// Reached stops are drawn opaque, the rest dimmed.
pub fn is_stop_reached(index: usize, stop_count: usize, progress: f64) -> bool {
    if index >= stop_count {
        return false;
    }
    index as f64 <= clamp(progress) * (stop_count - 1) as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Animating { started_at: Instant },
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub progress: f64,
    pub is_animating: bool,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackFrame {
    pub progress: f64,
    pub path: Vec<Point>,
    pub position: Option<Point>,
    pub reached: Vec<bool>,
}

/// Playback state of the currently shown route.
#[derive(Debug, Clone)]
pub struct PlaybackEngine {
    duration: Duration,
    animation_enabled: bool,
    phase: PlaybackPhase,
    progress: f64,
    /// Stop count of the loaded route, `None` until a route is loaded.
    loaded: Option<usize>,
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PlaybackEngine {
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);

    pub fn new(animation_enabled: bool) -> Self {
        Self {
            duration: Self::DEFAULT_DURATION,
            animation_enabled,
            phase: PlaybackPhase::Idle,
            progress: 0.0,
            loaded: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn animation_enabled(&self) -> bool {
        self.animation_enabled
    }

    /// Shows a new route, restarting playback from the beginning.
    pub fn load(&mut self, route: &RouteModel, now: Instant) {
        self.loaded = Some(route.len());
        self.restart(now);
    }

    /// Turning animation on replays the loaded route, turning it off shows
    /// the whole route at once.
    pub fn set_animation_enabled(&mut self, enabled: bool, now: Instant) {
        self.animation_enabled = enabled;
        if self.loaded.is_some() {
            self.restart(now);
        }
    }

    fn restart(&mut self, now: Instant) {
        self.phase = PlaybackPhase::Idle;
        self.progress = 0.0;

        let animatable = self.loaded.is_some_and(|stops| stops >= 2);
        if self.animation_enabled && animatable {
            log::debug!("animating {:?} stops.", self.loaded);
            self.phase = PlaybackPhase::Animating { started_at: now };
        } else {
            self.complete();
        }
    }

    fn complete(&mut self) {
        self.phase = PlaybackPhase::Complete;
        self.progress = 1.0;
    }

    /// Advances playback to `now` and returns the progress. Progress never
    /// decreases within one playback, whatever timestamps are passed in.
    pub fn tick(&mut self, now: Instant) -> f64 {
        if let PlaybackPhase::Animating { started_at } = self.phase {
            let sampled = progress_between(started_at, now, self.duration);
            self.progress = self.progress.max(sampled);
            if self.progress >= 1.0 {
                log::debug!("playback complete.");
                self.complete();
            }
        }
        self.progress
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, PlaybackPhase::Animating { .. })
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            progress: self.progress,
            is_animating: self.is_animating(),
        }
    }

    /// Forgets the loaded route.
    pub fn reset(&mut self) {
        self.phase = PlaybackPhase::Idle;
        self.progress = 0.0;
        self.loaded = None;
    }

    /// The frame for `stops` at the current progress.
    pub fn frame(&self, stops: &[RouteStop]) -> PlaybackFrame {
        PlaybackFrame {
            progress: self.progress,
            path: partial_path(stops, self.progress),
            position: current_position(stops, self.progress),
            reached: (0..stops.len())
                .map(|index| is_stop_reached(index, stops.len(), self.progress))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use model::{stop::Waypoint, ExampleData};
    use proptest::prelude::*;

    use super::*;

    fn straight_route(stops: usize) -> RouteModel {
        let waypoints = (0..stops)
            .map(|index| {
                Waypoint::pick(
                    format!("A{index:02}"),
                    format!("SKU-{index}"),
                    index as f64 * 10.0,
                    0.0,
                )
            })
            .collect();
        RouteModel::through("nearest_neighbor", waypoints)
    }

    fn positions(route: &RouteModel) -> Vec<Point> {
        route
            .ordered_stops()
            .iter()
            .map(RouteStop::position)
            .collect()
    }

    #[test]
    fn progress_is_capped_and_total() {
        let duration = Duration::from_millis(3000);
        assert_eq!(progress(Duration::ZERO, duration), 0.0);
        assert_eq!(progress(Duration::from_millis(1500), duration), 0.5);
        assert_eq!(progress(Duration::from_millis(9000), duration), 1.0);
        assert_eq!(progress(Duration::from_millis(5), Duration::ZERO), 1.0);

        let start = Instant::now();
        let later = start + Duration::from_millis(750);
        assert_eq!(progress_between(start, later, duration), 0.25);
        assert_eq!(progress_between(later, start, duration), 0.0);
    }

    #[test]
    fn partial_path_interpolates_current_leg() {
        let route = straight_route(3);
        let stops = route.ordered_stops();

        let path = partial_path(stops, 0.25);
        assert_eq!(path, vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0)]);

        let path = partial_path(stops, 0.5);
        assert_eq!(path, vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);

        assert_eq!(current_position(stops, 0.75), Some(Point::new(15.0, 0.0)));
        assert_eq!(current_position(stops, 0.5), Some(Point::new(10.0, 0.0)));
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        let route = straight_route(3);
        let stops = route.ordered_stops();

        assert_eq!(partial_path(stops, -1.0), partial_path(stops, 0.0));
        assert_eq!(partial_path(stops, 7.0), positions(&route));
        assert_eq!(partial_path(stops, f64::NAN), vec![Point::new(0.0, 0.0)]);
    }

    #[test]
    fn degenerate_routes_have_trivial_geometry() {
        assert!(partial_path(&[], 0.5).is_empty());
        assert_eq!(current_position(&[], 0.5), None);
        assert!(!is_stop_reached(0, 0, 1.0));

        let route = straight_route(1);
        assert_eq!(partial_path(route.ordered_stops(), 0.5), positions(&route));
        assert_eq!(
            current_position(route.ordered_stops(), 0.5),
            Some(Point::new(0.0, 0.0))
        );
    }

    #[test]
    fn stops_are_reached_in_order() {
        let reached = (0..5)
            .map(|index| is_stop_reached(index, 5, 0.5))
            .collect::<Vec<_>>();
        assert_eq!(reached, vec![true, true, true, false, false]);
        assert!(!is_stop_reached(5, 5, 1.0));
    }

    #[test]
    fn engine_animates_then_completes() {
        let start = Instant::now();
        let mut engine = PlaybackEngine::default();
        assert_eq!(engine.phase(), PlaybackPhase::Idle);
        assert_eq!(engine.progress(), 0.0);

        engine.load(&RouteModel::example_data(), start);
        assert_eq!(
            engine.phase(),
            PlaybackPhase::Animating { started_at: start }
        );
        assert_eq!(
            engine.state(),
            PlaybackState {
                progress: 0.0,
                is_animating: true
            }
        );

        assert_eq!(engine.tick(start + Duration::from_millis(1500)), 0.5);
        assert!(engine.is_animating());

        assert_eq!(engine.tick(start + Duration::from_millis(3200)), 1.0);
        assert_eq!(engine.phase(), PlaybackPhase::Complete);
        assert_eq!(engine.tick(start), 1.0);
    }

    #[test]
    fn engine_progress_never_goes_back() {
        let start = Instant::now();
        let mut engine = PlaybackEngine::new(true);
        engine.load(&straight_route(4), start);

        engine.tick(start + Duration::from_millis(2000));
        let before = engine.progress();
        engine.tick(start + Duration::from_millis(1000));
        assert_eq!(engine.progress(), before);
    }

    #[test]
    fn new_route_restarts_playback() {
        let start = Instant::now();
        let mut engine = PlaybackEngine::new(true).with_duration(Duration::from_secs(1));
        engine.load(&straight_route(3), start);
        engine.tick(start + Duration::from_secs(2));
        assert_eq!(engine.phase(), PlaybackPhase::Complete);

        let later = start + Duration::from_secs(5);
        engine.load(&straight_route(5), later);
        assert_eq!(engine.progress(), 0.0);
        assert_eq!(
            engine.phase(),
            PlaybackPhase::Animating { started_at: later }
        );
    }

    #[test]
    fn disabled_animation_shows_whole_route() {
        let start = Instant::now();
        let mut engine = PlaybackEngine::new(false);
        let route = straight_route(3);
        engine.load(&route, start);
        assert_eq!(engine.phase(), PlaybackPhase::Complete);
        assert_eq!(engine.frame(route.ordered_stops()).path, positions(&route));

        engine.set_animation_enabled(true, start);
        assert!(engine.is_animating());
        assert_eq!(engine.progress(), 0.0);

        engine.set_animation_enabled(false, start);
        assert_eq!(
            engine.state(),
            PlaybackState {
                progress: 1.0,
                is_animating: false
            }
        );
    }

    #[test]
    fn degenerate_route_is_never_animated() {
        let mut engine = PlaybackEngine::new(true);
        engine.load(&straight_route(1), Instant::now());
        assert_eq!(engine.phase(), PlaybackPhase::Complete);

        engine.reset();
        assert_eq!(engine.phase(), PlaybackPhase::Idle);
        engine.set_animation_enabled(true, Instant::now());
        assert_eq!(engine.phase(), PlaybackPhase::Idle);
    }

    #[test]
    fn frame_bundles_geometry() {
        let start = Instant::now();
        let route = straight_route(3);
        let mut engine = PlaybackEngine::new(true).with_duration(Duration::from_millis(400));
        engine.load(&route, start);
        engine.tick(start + Duration::from_millis(100));

        let frame = engine.frame(route.ordered_stops());
        assert_eq!(frame.progress, 0.25);
        assert_eq!(frame.position, Some(Point::new(5.0, 0.0)));
        assert_eq!(frame.reached, vec![true, false, false]);
        assert_eq!(frame.path.len(), 2);
    }

    fn any_route() -> impl Strategy<Value = RouteModel> {
        prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 0..25).prop_map(|points| {
            let waypoints = points
                .into_iter()
                .enumerate()
                .map(|(index, (x, y))| Waypoint::pass(format!("R{index:03}"), x, y))
                .collect();
            RouteModel::through("hybrid", waypoints)
        })
    }

    proptest! {
        #[test]
        fn path_ends_are_exact(route in any_route()) {
            let stops = route.ordered_stops();
            let all = positions(&route);

            prop_assert_eq!(partial_path(stops, 0.0), all.iter().take(1).copied().collect::<Vec<_>>());
            prop_assert_eq!(partial_path(stops, 1.0), all);
        }

        #[test]
        fn path_grows_monotonically(
            route in any_route(),
            first in 0.0f64..=1.0,
            second in 0.0f64..=1.0,
        ) {
            let (low, high) = if first <= second { (first, second) } else { (second, first) };
            let stops = route.ordered_stops();

            let reached = (0..stops.len())
                .filter(|index| is_stop_reached(*index, stops.len(), low))
                .count();
            let shorter = partial_path(stops, low);
            let longer = partial_path(stops, high);

            prop_assert!(longer.len() >= reached);
            prop_assert_eq!(&shorter[..reached], &longer[..reached]);
        }
    }
}
