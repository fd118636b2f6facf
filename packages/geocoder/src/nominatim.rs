//! Nominatim-compatible search client.
//!
//! Serves both the public `OpenStreetMap` instance and hosted
//! re-implementations such as maps.co, which accept the same `q`
//! parameter plus an `api_key`.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use crime_advice_geography_models::Coordinates;

use crate::{GeocodeError, GeocodedPlace, Geocoder};

/// A Nominatim-style `/search` endpoint.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NominatimGeocoder {
    /// Creates a geocoder against `base_url` (the full `/search` URL).
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// The configured search URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<GeocodedPlace, GeocodeError> {
        geocode_freeform(&self.client, &self.base_url, self.api_key.as_deref(), query).await
    }
}

/// Geocodes a free-form query and returns the first result.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request fails, the service answers
/// with a non-success status, the body cannot be parsed, or the result set
/// is empty.
pub async fn geocode_freeform(
    client: &reqwest::Client,
    base_url: &str,
    api_key: Option<&str>,
    query: &str,
) -> Result<GeocodedPlace, GeocodeError> {
    let mut params = vec![("q", query), ("format", "json")];
    if let Some(key) = api_key {
        params.push(("api_key", key));
    }

    log::debug!("Geocoding '{query}' via {base_url}");

    let resp = client.get(base_url).query(&params).send().await?;

    let status = resp.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }
    if !status.is_success() {
        return Err(GeocodeError::Status { status });
    }

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)?.ok_or_else(|| GeocodeError::NoResults {
        query: query.to_string(),
    })
}

/// Parses a Nominatim JSON response, returning the first result.
///
/// `lat`/`lon` are strings in Nominatim output; numeric values are also
/// accepted.
pub(crate) fn parse_response(
    body: &serde_json::Value,
) -> Result<Option<GeocodedPlace>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Geocode response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = coordinate_field(first, "lat")?;
    let lon = coordinate_field(first, "lon")?;
    let display_name = first["display_name"].as_str().map(String::from);

    Ok(Some(GeocodedPlace {
        coordinates: Coordinates::new(lat, lon),
        display_name,
    }))
}

fn coordinate_field(result: &serde_json::Value, field: &str) -> Result<f64, GeocodeError> {
    let value = &result[field];
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        .ok_or_else(|| GeocodeError::Parse {
            message: format!("Missing {field} in geocode response"),
        })
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, HttpServer, http::StatusCode, web};

    use super::*;

    /// Serves `body` with `status` for every request on an ephemeral port.
    fn stub_server(status: u16, body: &'static str) -> String {
        let status = StatusCode::from_u16(status).unwrap();
        let server = HttpServer::new(move || {
            App::new().default_service(web::to(move || async move {
                HttpResponse::build(status)
                    .content_type("application/json")
                    .body(body)
            }))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{addr}")
    }

    fn geocoder(base: &str) -> NominatimGeocoder {
        NominatimGeocoder::new(reqwest::Client::new(), format!("{base}/search"), None)
    }

    #[test]
    fn parses_string_coordinates() {
        let body = serde_json::json!([{
            "lat": "52.6361",
            "lon": "-1.1331",
            "display_name": "Leicester, England, United Kingdom"
        }, {
            "lat": "0",
            "lon": "0"
        }]);
        let place = parse_response(&body).unwrap().unwrap();
        assert!((place.coordinates.latitude - 52.6361).abs() < 1e-4);
        assert!((place.coordinates.longitude - -1.1331).abs() < 1e-4);
        assert_eq!(
            place.display_name.as_deref(),
            Some("Leicester, England, United Kingdom")
        );
    }

    #[test]
    fn parses_numeric_coordinates() {
        let body = serde_json::json!([{ "lat": 52.63, "lon": -1.13 }]);
        let place = parse_response(&body).unwrap().unwrap();
        assert_eq!(place.coordinates, Coordinates::new(52.63, -1.13));
        assert!(place.display_name.is_none());
    }

    #[test]
    fn empty_result_set_is_none() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_non_array_and_missing_fields() {
        let err = parse_response(&serde_json::json!({ "error": "bad key" })).unwrap_err();
        assert!(matches!(err, GeocodeError::Parse { .. }));

        let err = parse_response(&serde_json::json!([{ "lat": "52.6" }])).unwrap_err();
        assert!(matches!(err, GeocodeError::Parse { message } if message.contains("lon")));
    }

    #[tokio::test]
    async fn unreachable_service_is_http_error() {
        let geocoder = NominatimGeocoder::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/search".to_string(),
            None,
        );
        let err = geocoder.geocode("Leicester").await.unwrap_err();
        assert!(matches!(err, GeocodeError::Http(_)));
    }

    #[actix_web::test]
    async fn too_many_requests_is_rate_limited() {
        let base = stub_server(429, "[]");
        let err = geocoder(&base).geocode("Leicester").await.unwrap_err();
        assert!(matches!(err, GeocodeError::RateLimited));
        assert_eq!(err.to_string(), "Rate limit exceeded");
    }

    #[actix_web::test]
    async fn error_statuses_are_reported() {
        for code in [404, 500] {
            let base = stub_server(code, r#"{"error":"nope"}"#);
            let err = geocoder(&base).geocode("Leicester").await.unwrap_err();
            assert!(
                matches!(&err, GeocodeError::Status { status } if status.as_u16() == code),
                "{code}: {err:?}"
            );
            assert!(err.to_string().starts_with(&format!("Geocode API error: {code}")));
        }
    }

    #[actix_web::test]
    async fn empty_search_is_no_results() {
        let base = stub_server(200, "[]");
        let err = geocoder(&base).geocode("Atlantis").await.unwrap_err();
        assert_eq!(err.to_string(), "No geocoding results for 'Atlantis'");
    }

    #[actix_web::test]
    async fn first_search_result_is_returned() {
        let base = stub_server(
            200,
            r#"[{"lat":"52.6361","lon":"-1.1331","display_name":"Leicester"}]"#,
        );
        let place = geocoder(&base).geocode("Leicester").await.unwrap();
        assert_eq!(place.coordinates, Coordinates::new(52.6361, -1.1331));
        assert_eq!(place.display_name.as_deref(), Some("Leicester"));
    }
}
