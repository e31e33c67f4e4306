use std::fmt;
use std::str::FromStr;

pub(super) const OPERATION: &str = "amap.search_nearby_cinemas";
pub(super) const PATH: &str = "/v5/place/around";

/// POI type code for cinemas.
pub const CINEMA_TYPE_CODE: &str = "080601";
pub const SEARCH_RADIUS_METERS: u32 = 10_000;
pub const SHOW_FIELDS: &str = "business";

/// A point in GCJ-02 longitude/latitude, as AMap expects it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

impl Default for Coordinate {
    fn default() -> Self {
        Self {
            lng: 121.214160,
            lat: 31.286012,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lng, self.lat)
    }
}

impl FromStr for Coordinate {
    type Err = String;

    /// Parses `"lng,lat"`, the same shape AMap returns in `location`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lng, lat) = s
            .split_once(',')
            .ok_or_else(|| format!("expected 'lng,lat', got '{s}'"))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| format!("invalid longitude '{lng}'"))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("invalid latitude '{lat}'"))?;
        if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
            return Err(format!("coordinate out of range: {lng},{lat}"));
        }
        Ok(Self { lng, lat })
    }
}

pub(super) fn query(around: Coordinate) -> Vec<(&'static str, String)> {
    vec![
        ("location", around.to_string()),
        ("types", CINEMA_TYPE_CODE.to_string()),
        ("radius", SEARCH_RADIUS_METERS.to_string()),
        ("show_fields", SHOW_FIELDS.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_coordinate_renders_lng_first() {
        assert_eq!(Coordinate::default().to_string(), "121.214160,31.286012");
    }

    #[test]
    fn parses_location_strings() {
        let c: Coordinate = "116.397428, 39.90923".parse().unwrap();
        assert_eq!(c.lng, 116.397428);
        assert_eq!(c.lat, 39.90923);
        assert!("116.4".parse::<Coordinate>().is_err());
        assert!("abc,39.9".parse::<Coordinate>().is_err());
        assert!("200,39.9".parse::<Coordinate>().is_err());
    }

    #[test]
    fn query_is_fixed_to_cinemas_within_ten_km() {
        let q = query(Coordinate::default());
        assert_eq!(
            q,
            vec![
                ("location", "121.214160,31.286012".to_string()),
                ("types", "080601".to_string()),
                ("radius", "10000".to_string()),
                ("show_fields", "business".to_string()),
            ]
        );
    }
}
