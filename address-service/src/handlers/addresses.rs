//! Address endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{IntoResponse, Response},
    Json,
};

use super::error::{ApiError, ApiOperation};
use crate::models::{Address, AddressData};
use crate::repository::{Repository, SearchQuery};
use crate::responses::{Created, NoContent};
use crate::state::AppState;

const ADDRESS_NOT_FOUND: &str = "Address not found";
const PAIR_NOT_FOUND: &str = "One or both addresses not found in DB";

/// 200 with the list, or 204 when there is nothing to return
fn collection(addresses: Vec<Address>) -> Response {
    if addresses.is_empty() {
        NoContent.into_response()
    } else {
        Json(addresses).into_response()
    }
}

fn body(
    payload: Result<Json<AddressData>, JsonRejection>,
    operation: ApiOperation,
) -> Result<AddressData, ApiError> {
    let Json(data) = payload.map_err(|rejection| {
        ApiError::bad_request(operation, rejection.body_text())
    })?;
    data.validate()
        .map_err(|errors| ApiError::from(errors).with_operation(operation))?;
    Ok(data)
}

/// `GET /addresses`
pub async fn list_addresses(State(state): State<AppState>) -> Result<Response, ApiError> {
    tracing::info!("listing addresses");
    let addresses = state.addresses().find_all().await?;
    Ok(collection(addresses))
}

/// `GET /addresses/{id}`
///
/// A missing address answers 204, not 404.
pub async fn get_address(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    tracing::info!(id, "fetching address");
    let response = match state.addresses().find_by_id(&id).await? {
        Some(address) => Json(address).into_response(),
        None => NoContent.into_response(),
    };
    Ok(response)
}

/// `GET /addresses/{search_value}/{sort_by}/{ascending}`
pub async fn search_addresses(
    State(state): State<AppState>,
    Path((search_value, sort_by, ascending)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    let ascending = parse_bool(&ascending).ok_or_else(|| {
        ApiError::bad_request(
            ApiOperation::Search,
            format!("The value '{}' is not valid for ascending.", ascending),
        )
    })?;

    tracing::info!(%search_value, %sort_by, ascending, "searching addresses");
    let query = SearchQuery::new(search_value, sort_by, ascending);
    let addresses = state.addresses().search(&query).await?;
    Ok(collection(addresses))
}

/// `POST /addresses`
pub async fn create_address(
    State(state): State<AppState>,
    payload: Result<Json<AddressData>, JsonRejection>,
) -> Result<Created<Address>, ApiError> {
    let data = body(payload, ApiOperation::Create)?;

    let address = state.addresses().create(data).await?;
    tracing::info!(id = address.id, "address created");

    let location = format!("/addresses/{}", address.id);
    Ok(Created::new(address).with_location(location))
}

/// `PUT /addresses/{id}`
///
/// The id in the path wins over any id in the body.
pub async fn update_address(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<AddressData>, JsonRejection>,
) -> Result<NoContent, ApiError> {
    let data = body(payload, ApiOperation::Update)?;

    tracing::info!(id, "updating address");
    if !state.addresses().exists(&id).await? {
        return Err(ApiError::not_found(ApiOperation::Update, ADDRESS_NOT_FOUND)
            .with_entity("Address", id.to_string()));
    }

    state.addresses().update(&id, data).await?;
    Ok(NoContent)
}

/// `DELETE /addresses/{id}`
pub async fn delete_address(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<NoContent, ApiError> {
    tracing::info!(id, "deleting address");
    if !state.addresses().exists(&id).await? {
        return Err(ApiError::not_found(ApiOperation::Delete, ADDRESS_NOT_FOUND)
            .with_entity("Address", id.to_string()));
    }

    state.addresses().delete(&id).await?;
    Ok(NoContent)
}

/// `GET /addresses/calculateDistance/{id1}/{id2}`
pub async fn calculate_distance(
    State(state): State<AppState>,
    Path((id1, id2)): Path<(i64, i64)>,
) -> Result<Response, ApiError> {
    tracing::info!(id1, id2, "calculating distance");

    let first = state.addresses().find_by_id(&id1).await?;
    let second = state.addresses().find_by_id(&id2).await?;
    let (Some(address1), Some(address2)) = (first, second) else {
        return Err(ApiError::not_found(ApiOperation::CalculateDistance, PAIR_NOT_FOUND));
    };

    let distance = state.distances().calculate(address1, address2).await?;
    Ok(Json(distance).into_response())
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DatabaseConfig};
    use crate::geocoding::{Coordinate, Geocoder, GeocodingError};
    use crate::routes;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Places every address by city; unknown cities have no result
    struct CityGeocoder;

    #[async_trait]
    impl Geocoder for CityGeocoder {
        async fn geocode(&self, address: &Address) -> Result<Coordinate, GeocodingError> {
            match address.city.as_str() {
                "NYC" => Ok(Coordinate {
                    latitude: 40.7128,
                    longitude: -74.0060,
                }),
                "Boston" => Ok(Coordinate {
                    latitude: 42.3601,
                    longitude: -71.0589,
                }),
                "Broken" => Err(GeocodingError::InvalidResponse("lat missing".to_string())),
                _ => Err(GeocodingError::NoResult),
            }
        }
    }

    async fn app() -> Router {
        let config = Config {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let state = AppState::builder()
            .config(config)
            .geocoder(Arc::new(CityGeocoder))
            .without_tracing()
            .build()
            .await
            .unwrap();
        routes::router(state)
    }

    fn address_json(street: &str, city: &str) -> Value {
        json!({
            "street": street,
            "houseNumber": "5",
            "postcode": "10001",
            "city": city,
            "country": "US"
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn read_body(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn create(app: &Router, street: &str, city: &str) -> Address {
        let response = send(app, "POST", "/addresses", Some(address_json(street, city))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        serde_json::from_slice(&read_body(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_list_empty_is_no_content() {
        let app = app().await;
        let response = send(&app, "GET", "/addresses", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_create_returns_location() {
        let app = app().await;
        let response = send(&app, "POST", "/addresses", Some(address_json("Main St", "NYC"))).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let location = response.headers().get(header::LOCATION).unwrap().clone();
        let created: Address = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(location, format!("/addresses/{}", created.id).as_str());
        assert_eq!(created.street, "Main St");
    }

    #[tokio::test]
    async fn test_create_with_blank_field_is_bad_request() {
        let app = app().await;
        let response = send(&app, "POST", "/addresses", Some(address_json("", "NYC"))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
        assert!(body["errors"]["street"].is_array());
    }

    #[tokio::test]
    async fn test_create_with_malformed_json_is_bad_request() {
        let app = app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/addresses")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_existing_and_missing() {
        let app = app().await;
        let created = create(&app, "Main St", "NYC").await;

        let response = send(&app, "GET", &format!("/addresses/{}", created.id), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let fetched: Address = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(fetched, created);

        let response = send(&app, "GET", "/addresses/999", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_get_with_non_numeric_id_is_bad_request() {
        let app = app().await;
        let response = send(&app, "GET", "/addresses/abc", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_pins_path_id() {
        let app = app().await;
        let created = create(&app, "Main St", "NYC").await;

        let mut body = address_json("Elm Rd", "Boston");
        body["id"] = json!(12345);
        let response = send(&app, "PUT", &format!("/addresses/{}", created.id), Some(body)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, "GET", &format!("/addresses/{}", created.id), None).await;
        let fetched: Address = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.street, "Elm Rd");
        assert_eq!(fetched.city, "Boston");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let app = app().await;
        let response = send(&app, "PUT", "/addresses/999", Some(address_json("Elm Rd", "Boston"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(read_body(response).await, b"Address not found");
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let app = app().await;
        let created = create(&app, "Main St", "NYC").await;
        let uri = format!("/addresses/{}", created.id);

        let response = send(&app, "DELETE", &uri, None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, "DELETE", &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(read_body(response).await, b"Address not found");
    }

    #[tokio::test]
    async fn test_search_filters_and_sorts() {
        let app = app().await;
        let nyc = create(&app, "Main St", "NYC").await;
        let boston = create(&app, "Main Ave", "Boston").await;
        create(&app, "Elm Rd", "Austin").await;

        let response = send(&app, "GET", "/addresses/main/City/TRUE", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let found: Vec<Address> = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(found, vec![boston.clone(), nyc.clone()]);

        let response = send(&app, "GET", "/addresses/main/City/false", None).await;
        let found: Vec<Address> = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(found, vec![nyc, boston]);
    }

    #[tokio::test]
    async fn test_search_without_match_is_no_content() {
        let app = app().await;
        create(&app, "Main St", "NYC").await;
        let response = send(&app, "GET", "/addresses/zzz/City/true", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_search_with_bad_direction_is_bad_request() {
        let app = app().await;
        let response = send(&app, "GET", "/addresses/main/City/upwards", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_distance_between_stored_addresses() {
        let app = app().await;
        let nyc = create(&app, "Main St", "NYC").await;
        let boston = create(&app, "Elm Rd", "Boston").await;

        let uri = format!("/addresses/calculateDistance/{}/{}", nyc.id, boston.id);
        let response = send(&app, "GET", &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
        let km = body["distance"].as_f64().unwrap();
        assert!(km > 300.0 && km < 310.0, "unexpected distance {}", km);
        assert_eq!(body["address1"]["city"], "NYC");
        assert_eq!(body["address2"]["city"], "Boston");
    }

    #[tokio::test]
    async fn test_distance_with_missing_address() {
        let app = app().await;
        let nyc = create(&app, "Main St", "NYC").await;

        let uri = format!("/addresses/calculateDistance/{}/999", nyc.id);
        let response = send(&app, "GET", &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            read_body(response).await,
            b"One or both addresses not found in DB"
        );
    }

    #[tokio::test]
    async fn test_distance_without_geocoding_result() {
        let app = app().await;
        let nowhere = create(&app, "Nowhere Ln", "Atlantis").await;

        let uri = format!("/addresses/calculateDistance/{}/{}", nowhere.id, nowhere.id);
        let response = send(&app, "GET", &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            read_body(response).await,
            b"No result found in the geocoding response."
        );
    }

    #[tokio::test]
    async fn test_distance_with_invalid_geocoding_response() {
        let app = app().await;
        let broken = create(&app, "Main St", "Broken").await;

        let uri = format!("/addresses/calculateDistance/{}/{}", broken.id, broken.id);
        let response = send(&app, "GET", &uri, None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(read_body(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_empty_internal_error() {
        let config = Config {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let state = AppState::builder()
            .config(config)
            .geocoder(Arc::new(CityGeocoder))
            .without_tracing()
            .build()
            .await
            .unwrap();
        state.db().close().await;
        let app = routes::router(state);

        let response = send(&app, "GET", "/addresses", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(read_body(response).await.is_empty());

        let response = send(&app, "DELETE", "/addresses/1", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("False"), Some(false));
        assert_eq!(parse_bool("1"), None);
    }
}
