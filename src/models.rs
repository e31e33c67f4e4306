use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Provider fields without a typed counterpart, kept so bodies round-trip.
pub type Extra = Map<String, Value>;

// --- AMap ---

/// Envelope of the AMap weather endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub status: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub infocode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<String>,
    #[serde(default)]
    pub forecasts: Vec<WeatherForecast>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub city: String,
    pub adcode: String,
    pub province: String,
    pub reporttime: String,
    #[serde(default)]
    pub casts: Vec<CastInfo>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One day of a forecast. AMap may omit any field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CastInfo {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub week: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub dayweather: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub nightweather: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub daytemp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub nighttemp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub daywind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub nightwind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub daypower: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub nightpower: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Envelope of the AMap "search around a point" endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiResponse {
    pub status: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub infocode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<String>,
    #[serde(default)]
    pub pois: Vec<CinemaPoi>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CinemaPoi {
    pub name: String,
    pub id: String,
    /// "lng,lat"
    pub location: String,
    #[serde(default, deserialize_with = "required_text")]
    pub address: String,
    #[serde(default, deserialize_with = "required_text")]
    pub pname: String,
    #[serde(default, deserialize_with = "required_text")]
    pub cityname: String,
    #[serde(default, deserialize_with = "required_text")]
    pub adname: String,
    #[serde(default, deserialize_with = "required_text")]
    pub pcode: String,
    #[serde(default, deserialize_with = "required_text")]
    pub adcode: String,
    #[serde(default, deserialize_with = "required_text")]
    pub citycode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business: Option<BusinessInfo>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessInfo {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub business_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub opentime_today: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub opentime_week: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub tel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub parking_type: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// AMap writes empty text as `[]`; treat that (and null) as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Str(String),
        List(Vec<String>),
    }

    Ok(match Option::<Text>::deserialize(deserializer)? {
        Some(Text::Str(s)) => Some(s),
        Some(Text::List(items)) => {
            let joined = items.join(";");
            (!joined.is_empty()).then_some(joined)
        }
        None => None,
    })
}

fn required_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

// --- TMDB ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreList {
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub release_date: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    /// Ids into the genre list; resolved by the caller.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Date window attached to now-playing and upcoming lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub maximum: String,
    pub minimum: String,
}

/// One page of discover, search, category or similar results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    pub page: u32,
    pub results: Vec<MovieSummary>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<DateRange>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieReview {
    pub author: String,
    pub content: String,
    pub id: String,
    pub created_at: String,
    pub url: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPage {
    pub id: u64,
    pub page: u32,
    pub results: Vec<MovieReview>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieCredit {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub original_name: String,
    pub profile_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    pub id: u64,
    #[serde(default)]
    pub cast: Vec<MovieCredit>,
    #[serde(default)]
    pub crew: Vec<MovieCredit>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_array_business_fields_become_none() {
        let poi: CinemaPoi = serde_json::from_value(json!({
            "name": "Cinema A",
            "id": "B0FFG",
            "location": "121.2,31.2",
            "address": [],
            "pname": "上海市",
            "cityname": "上海市",
            "adname": "嘉定区",
            "pcode": "310000",
            "adcode": "310114",
            "citycode": "021",
            "business": { "tel": [], "rating": "4.6" }
        }))
        .expect("poi deserialize");

        assert_eq!(poi.address, "");
        let business = poi.business.expect("business block");
        assert_eq!(business.tel, None);
        assert_eq!(business.rating.as_deref(), Some("4.6"));
        assert_eq!(business.cost, None);
    }

    #[test]
    fn list_valued_text_is_joined() {
        let business: BusinessInfo = serde_json::from_value(json!({
            "tag": ["IMAX", "4DX"],
            "cost": "45.00"
        }))
        .expect("business deserialize");
        assert_eq!(business.tag.as_deref(), Some("IMAX;4DX"));
        assert_eq!(business.cost.as_deref(), Some("45.00"));
    }

    #[test]
    fn unmodelled_poi_fields_survive_a_round_trip() {
        let raw = json!({
            "name": "Cinema B",
            "id": "B0FFH",
            "location": "121.1,31.2",
            "address": "墨玉南路888号",
            "pname": "上海市",
            "cityname": "上海市",
            "adname": "嘉定区",
            "pcode": "310000",
            "adcode": "310114",
            "citycode": "021",
            "type": "体育休闲服务;影剧院;电影院",
            "typecode": "080601",
            "distance": "842"
        });
        let poi: CinemaPoi = serde_json::from_value(raw.clone()).expect("poi deserialize");
        assert_eq!(poi.extra.len(), 3);
        assert_eq!(serde_json::to_value(&poi).unwrap(), raw);
    }

    #[test]
    fn movie_summary_accepts_null_images() {
        let movie: MovieSummary = serde_json::from_value(json!({
            "id": 550,
            "title": "搏击俱乐部",
            "original_title": "Fight Club",
            "overview": "",
            "popularity": 61.4,
            "release_date": "1999-10-15",
            "poster_path": null,
            "backdrop_path": null,
            "vote_average": 8.4,
            "vote_count": 26280,
            "genre_ids": [18]
        }))
        .expect("movie deserialize");
        assert_eq!(movie.poster_path, None);
        assert_eq!(movie.genre_ids, vec![18]);
    }
}
