pub(super) const OPERATION: &str = "amap.fetch_weather";
pub(super) const PATH: &str = "/v3/weather/weatherInfo";

/// Jiading District, Shanghai.
pub const DEFAULT_CITY_CODE: &str = "310114";

pub(super) fn query(city_code: &str) -> Vec<(&'static str, String)> {
    let city = match city_code.trim() {
        "" => DEFAULT_CITY_CODE,
        code => code,
    };
    vec![
        ("city", city.to_string()),
        ("extensions", "all".to_string()),
        ("output", "JSON".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_full_forecast_as_json() {
        assert_eq!(
            query("110101"),
            vec![
                ("city", "110101".to_string()),
                ("extensions", "all".to_string()),
                ("output", "JSON".to_string()),
            ]
        );
    }

    #[test]
    fn blank_code_falls_back_to_default_region() {
        assert_eq!(query("  ")[0], ("city", DEFAULT_CITY_CODE.to_string()));
    }
}
