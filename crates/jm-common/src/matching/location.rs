use crate::GeoPoint;

use super::clamp_score;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Piecewise-linear proximity curve:
///
/// | km        | score      |
/// |-----------|------------|
/// | ≤ 5       | 100        |
/// | 5 – 20    | 100 → 70   |
/// | 20 – 50   | 70 → 40    |
/// | 50 – 100  | 40 → 10    |
/// | > 100     | 0          |
pub fn distance_to_score(distance_km: f64) -> f64 {
    if !distance_km.is_finite() {
        return 0.0;
    }

    let ramp = |from_km: f64, to_km: f64, from_score: f64| {
        from_score - (distance_km - from_km) / (to_km - from_km) * 30.0
    };

    if distance_km <= 5.0 {
        100.0
    } else if distance_km <= 20.0 {
        ramp(5.0, 20.0, 100.0)
    } else if distance_km <= 50.0 {
        ramp(20.0, 50.0, 70.0)
    } else if distance_km <= 100.0 {
        ramp(50.0, 100.0, 40.0)
    } else {
        0.0
    }
}

/// Points outside the WGS84 ranges count as missing.
pub fn location_score(candidate: Option<GeoPoint>, job: Option<GeoPoint>, job_remote: bool) -> u8 {
    if job_remote {
        return 100;
    }
    let usable = |point: Option<GeoPoint>| point.filter(|p| is_valid_point(*p));
    match (usable(candidate), usable(job)) {
        (Some(candidate), Some(job)) => clamp_score(distance_to_score(haversine_km(candidate, job))),
        _ => 50,
    }
}

/// Longitude in [-180, 180], latitude in [-90, 90], both finite.
pub fn is_valid_point(point: GeoPoint) -> bool {
    point.longitude.is_finite()
        && point.latitude.is_finite()
        && (-180.0..=180.0).contains(&point.longitude)
        && (-90.0..=90.0).contains(&point.latitude)
}
