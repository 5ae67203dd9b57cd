use indexmap::IndexMap;
use model::route::RouteModel;
use serde::Serialize;

/// Constants behind the derived metrics. They are placeholders for display,
/// not calibrated against a real warehouse, so every one can be overridden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsPolicy {
    /// Distance units walked per minute.
    pub walking_speed: f64,
    /// Minutes spent at each picking stop.
    pub pick_duration_minutes: f64,
    /// Distance units per pick that count as full utilization.
    pub distance_per_pick: f64,
}

impl Default for MetricsPolicy {
    fn default() -> Self {
        Self {
            walking_speed: 3.0,
            pick_duration_minutes: 0.5,
            distance_per_pick: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub picking_stops: usize,
    pub estimated_time_minutes: f64,
    /// Straight-line distance from first to last stop over the walked
    /// distance, in `[0, 1]`. Routes with fewer than two stops and no
    /// distance give 0.
    pub efficiency: f64,
    /// Picks per `distance_per_pick` units, capped at 1.
    pub distance_utilization: f64,
    /// Picking stops per zone label (`"Zone A"`, ...), in order of first
    /// appearance.
    pub zone_distribution: IndexMap<String, usize>,
}

impl MetricsPolicy {
    pub fn derive(&self, route: &RouteModel) -> DerivedMetrics {
        let total_distance = route.total_distance();
        let picking_stops = route.picks().count();

        let estimated_time_minutes = total_distance / self.walking_speed
            + picking_stops as f64 * self.pick_duration_minutes;

        let direct_distance = match (route.first(), route.last()) {
            (Some(first), Some(last)) if !route.is_degenerate() => {
                first.position().distance_to(&last.position())
            }
            _ => total_distance,
        };
        let efficiency = (direct_distance / total_distance.max(1.0)).min(1.0);

        let distance_utilization = (picking_stops as f64
            / (total_distance / self.distance_per_pick).max(1.0))
        .min(1.0);

        let mut zone_distribution = IndexMap::new();
        for zone in route.picks().filter_map(|stop| stop.zone()) {
            *zone_distribution.entry(format!("Zone {zone}")).or_insert(0) += 1;
        }

        DerivedMetrics {
            picking_stops,
            estimated_time_minutes,
            efficiency,
            distance_utilization,
            zone_distribution,
        }
    }
}

/// Derives the metrics of `route` under the default [`MetricsPolicy`].
pub fn derive(route: &RouteModel) -> DerivedMetrics {
    MetricsPolicy::default().derive(route)
}
