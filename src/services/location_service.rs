use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_LIMIT: usize = 8;
pub const MAX_LIMIT: usize = 20;

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("geocoding is not configured")]
    NotConfigured,
    #[error("upstream unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("upstream returned {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct LocationResult {
    pub id: String,
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One autocomplete suggestion. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct Suggestion {
    place_id: Option<String>,
    display_place: Option<String>,
    display_address: Option<String>,
    display_name: Option<String>,
    lat: Option<String>,
    lon: Option<String>,
}

impl Suggestion {
    fn into_result(self) -> Option<LocationResult> {
        let latitude = self.lat.as_deref()?.parse().ok()?;
        let longitude = self.lon.as_deref()?.parse().ok()?;
        let description = self
            .display_address
            .or_else(|| self.display_name.clone())
            .unwrap_or_default();
        Some(LocationResult {
            id: self.place_id.unwrap_or_default(),
            name: self.display_place.or(self.display_name).unwrap_or_default(),
            description,
            latitude,
            longitude,
        })
    }
}

fn parse_suggestions(body: Vec<Suggestion>) -> Vec<LocationResult> {
    body.into_iter().filter_map(Suggestion::into_result).collect()
}

pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

pub async fn search_locations_upstream(
    client: &reqwest::Client,
    base_url: &str,
    api_key: Option<&str>,
    q: &str,
    limit: usize,
) -> Result<Vec<LocationResult>, LocationError> {
    let api_key = api_key.ok_or(LocationError::NotConfigured)?;
    let url = format!("{}/autocomplete", base_url.trim_end_matches('/'));
    let limit = limit.to_string();

    let resp = client
        .get(&url)
        .query(&[
            ("key", api_key),
            ("q", q),
            ("limit", limit.as_str()),
            ("format", "json"),
        ])
        .send()
        .await
        .map_err(|e| {
            warn!(error = %e, "location search upstream unreachable");
            e
        })?;

    if !resp.status().is_success() {
        warn!(status = %resp.status(), "location search upstream non-OK");
        return Err(LocationError::Status(resp.status()));
    }

    let body: Vec<Suggestion> = resp.json().await.map_err(|e| {
        warn!(error = %e, "location search upstream JSON parse failed");
        e
    })?;
    Ok(parse_suggestions(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_without_coordinates_are_skipped() {
        let body: Vec<Suggestion> = serde_json::from_str(
            r#"[
                {"place_id":"1","display_place":"London","display_address":"England, UK",
                 "lat":"51.5073","lon":"-0.1277"},
                {"place_id":"2","display_place":"Nowhere"},
                {"place_id":"3","display_name":"Paris, France","lat":"48.85","lon":"2.35"}
            ]"#,
        )
        .unwrap();

        let results = parse_suggestions(body);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "London");
        assert_eq!(results[0].description, "England, UK");
        assert!((results[0].latitude - 51.5073).abs() < 1e-9);
        assert_eq!(results[1].name, "Paris, France");
        assert_eq!(results[1].description, "Paris, France");
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(99)), MAX_LIMIT);
    }

    #[tokio::test]
    async fn missing_key_is_reported_without_a_request() {
        let client = reqwest::Client::new();
        let result =
            search_locations_upstream(&client, "http://127.0.0.1:9", None, "london", 5).await;
        assert!(matches!(result, Err(LocationError::NotConfigured)));
    }
}
