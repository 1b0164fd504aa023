//! HTTP handler functions for the homescope API.

use std::sync::Arc;

use actix_web::{HttpResponse, http::header, web};
use homescope_analytics::RangePercent;
use homescope_auth::{OAuthProvider, SignUpForm};
use homescope_dashboard::{Dashboard, MarketEntry};
use homescope_server_models::{
    ApiChartRow, ApiError, ApiHealth, ApiLeaderboards, ApiLegendEntry, ApiMarketEntry,
    ApiSelectionOutcome, ApiSeriesRequest, ApiSeriesResponse, ApiSignUpRequest,
    ApiSignUpResponse, ApiSuggestion, ApiVariable, ApiVariableGroup, ForecastQueryParams,
    PlaceQueryParams, VariableQueryParams,
};
use homescope_variables::{filter_by_name, group_by_category, visible_variables};

use crate::AppState;

fn unavailable(what: &str) -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(ApiError::new(format!("{what} is not configured")))
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/variables`
///
/// Returns the pickable metrics grouped by category, optionally filtered
/// by `?q=`.
pub async fn variables(
    state: web::Data<AppState>,
    params: web::Query<VariableQueryParams>,
) -> HttpResponse {
    match state.source.variables().await {
        Ok(catalog) => {
            let visible = visible_variables(&catalog);
            let matching: Vec<_> =
                filter_by_name(&visible, params.q.as_deref().unwrap_or_default())
                    .into_iter()
                    .cloned()
                    .collect();

            let groups: Vec<ApiVariableGroup> = group_by_category(&matching)
                .into_iter()
                .map(|(category, vars)| ApiVariableGroup {
                    category,
                    variables: vars.into_iter().map(ApiVariable::from).collect(),
                })
                .collect();

            HttpResponse::Ok().json(groups)
        }
        Err(e) => {
            log::error!("Failed to query variables: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to query variables"))
        }
    }
}

/// `GET /api/places?input=`
///
/// Returns autocomplete suggestions for partially typed location text.
pub async fn places(
    state: web::Data<AppState>,
    params: web::Query<PlaceQueryParams>,
) -> HttpResponse {
    let Some(client) = &state.places else {
        return unavailable("Location search");
    };

    match client.autocomplete(&params.input).await {
        Ok(suggestions) => HttpResponse::Ok().json(
            suggestions
                .into_iter()
                .map(|s| ApiSuggestion {
                    place_id: s.place_id,
                    description: s.description,
                })
                .collect::<Vec<_>>(),
        ),
        Err(e) => {
            log::error!("Place autocomplete failed: {e}");
            HttpResponse::BadGateway().json(ApiError::new("Location search failed"))
        }
    }
}

/// `GET /api/places/{place_id}`
///
/// Resolves a picked suggestion into a location.
pub async fn place(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let Some(client) = &state.places else {
        return unavailable("Location search");
    };

    match client.resolve(&path).await {
        Ok(Some(location)) => HttpResponse::Ok().json(location),
        Ok(None) => HttpResponse::NotFound().json(ApiError::new("Could not resolve that place")),
        Err(e) => {
            log::error!("Place details failed: {e}");
            HttpResponse::BadGateway().json(ApiError::new("Location search failed"))
        }
    }
}

/// `POST /api/series`
///
/// Runs one dashboard refresh for the requested selection and returns the
/// windowed rows with their legend.
pub async fn series(
    state: web::Data<AppState>,
    body: web::Json<ApiSeriesRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    let mut dash = Dashboard::new(Arc::clone(&state.source));
    dash.load_catalog().await;

    let mut selection = Vec::with_capacity(req.locations.len() + req.variables.len());

    for location in req.locations {
        let item = location.name.clone();
        let outcome = dash.add_location(location);
        selection.push(ApiSelectionOutcome {
            item,
            outcome: Some(outcome),
        });
    }

    for key in req.variables {
        let outcome = dash.select_variable(&key);
        selection.push(ApiSelectionOutcome { item: key, outcome });
    }

    if let Some(range) = req.range {
        dash.set_range(RangePercent::new(range.start, range.end));
    }

    dash.refresh().await;
    let view = dash.view();

    HttpResponse::Ok().json(ApiSeriesResponse {
        rows: view.rows.into_iter().map(ApiChartRow::from).collect(),
        total_rows: view.total_rows,
        legend: view
            .legend
            .into_iter()
            .map(|e| ApiLegendEntry {
                label: e.label,
                color: e.color,
                latest: e.last_value_text,
                change: e.percent_change_text,
            })
            .collect(),
        hint: view.hint,
        selection,
    })
}

fn api_market(entry: &MarketEntry) -> ApiMarketEntry {
    ApiMarketEntry {
        name: entry.name.clone(),
        metric: entry.metric.clone(),
        value: entry.value,
        formatted: entry.formatted_value(),
    }
}

/// `GET /api/markets`
///
/// Returns the highest and lowest market leaderboards.
pub async fn markets() -> HttpResponse {
    match homescope_dashboard::leaderboards() {
        Ok(boards) => HttpResponse::Ok().json(ApiLeaderboards {
            highest: boards.highest.iter().map(api_market).collect(),
            lowest: boards.lowest.iter().map(api_market).collect(),
        }),
        Err(e) => {
            log::error!("Failed to load leaderboards: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to load leaderboards"))
        }
    }
}

/// `GET /api/forecast`
///
/// Returns the forecast teaser, unlocked with `?subscribed=true`.
pub async fn forecast(params: web::Query<ForecastQueryParams>) -> HttpResponse {
    match homescope_dashboard::forecast() {
        Ok(fc) => HttpResponse::Ok().json(fc.teaser(params.subscribed)),
        Err(e) => {
            log::error!("Failed to load forecast: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to load forecast"))
        }
    }
}

/// `POST /api/auth/signup`
///
/// Email/password sign-up. Failures come back as an inline `error`.
pub async fn sign_up(
    state: web::Data<AppState>,
    body: web::Json<ApiSignUpRequest>,
) -> HttpResponse {
    let Some(client) = &state.auth else {
        return unavailable("Sign-up");
    };

    let req = body.into_inner();
    let mut form = SignUpForm::new(req.email, req.password);
    let redirect = form.submit(client).await;

    let response = ApiSignUpResponse {
        redirect: redirect.map(String::from),
        notice: form.notice,
        error: form.error,
    };

    if response.error.is_some() {
        HttpResponse::BadRequest().json(response)
    } else {
        HttpResponse::Ok().json(response)
    }
}

/// `GET /api/auth/oauth/{provider}`
///
/// Redirects to the provider's sign-in page.
pub async fn oauth(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let Ok(provider) = path.parse::<OAuthProvider>() else {
        return HttpResponse::BadRequest()
            .json(ApiError::new(format!("Unsupported provider '{path}'")));
    };

    let Some(client) = &state.auth else {
        return unavailable("Sign-up");
    };

    match client.oauth_authorize_url(provider) {
        Ok(url) => HttpResponse::Found()
            .insert_header((header::LOCATION, url))
            .finish(),
        Err(e) => {
            log::error!("Failed to build {provider} authorize URL: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Sign-in is unavailable"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use homescope_database::{DbError, MarketSource};
    use homescope_geography::NameFilter;
    use homescope_market_models::{GeoEntity, Granularity, Observation, ValueType, Variable};

    use crate::{AppState, api_scope};

    struct StubSource;

    #[async_trait]
    impl MarketSource for StubSource {
        async fn variables(&self) -> Result<Vec<Variable>, DbError> {
            Ok(vec![
                Variable {
                    id: 1,
                    key: "median_list_price".to_string(),
                    label: "Median List Price".to_string(),
                    category: Some("Prices".to_string()),
                    description: None,
                    value_type: Some(ValueType::Currency),
                },
                Variable {
                    id: 2,
                    key: "median_list_price_mom".to_string(),
                    label: "Median List Price MoM".to_string(),
                    category: Some("Prices".to_string()),
                    description: None,
                    value_type: Some(ValueType::Percent),
                },
                Variable {
                    id: 3,
                    key: "active_listings".to_string(),
                    label: "Active Listings".to_string(),
                    category: Some("Inventory".to_string()),
                    description: None,
                    value_type: Some(ValueType::Number),
                },
            ])
        }

        async fn candidate_entities(
            &self,
            _variable_id: i64,
            granularity: Granularity,
            _filter: &NameFilter,
        ) -> Result<Vec<GeoEntity>, DbError> {
            Ok(match granularity {
                Granularity::Zip => vec![GeoEntity {
                    id: 7,
                    name: "90210".to_string(),
                    geo_type: "zip".to_string(),
                }],
                _ => Vec::new(),
            })
        }

        async fn observations(
            &self,
            _variable_id: i64,
            _geo_id: i64,
        ) -> Result<Vec<Observation>, DbError> {
            Ok((1..=4)
                .map(|m| Observation {
                    date: NaiveDate::from_ymd_opt(2024, m, 1).unwrap(),
                    value: f64::from(m) * 1_000_000.0,
                    change: None,
                })
                .collect())
        }
    }

    fn state() -> actix_web::web::Data<AppState> {
        actix_web::web::Data::new(AppState {
            source: Arc::new(StubSource),
            places: None,
            auth: None,
        })
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().app_data(state()).service(api_scope())).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
    }

    #[actix_web::test]
    async fn variables_are_grouped_without_derived_variants() {
        let app = test::init_service(App::new().app_data(state()).service(api_scope())).await;
        let req = test::TestRequest::get().uri("/api/variables").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        let groups = body.as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["category"], "Inventory");
        assert_eq!(groups[1]["variables"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::get()
            .uri("/api/variables?q=listings")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn series_returns_rows_legend_and_outcomes() {
        let app = test::init_service(App::new().app_data(state()).service(api_scope())).await;
        let req = test::TestRequest::post()
            .uri("/api/series")
            .set_json(serde_json::json!({
                "locations": [
                    { "name": "90210", "granularity": "zip" },
                    { "name": "ZIP 90210", "granularity": "zip" }
                ],
                "variables": ["median_list_price", "unknown_metric"],
                "range": { "start": 50.0, "end": 100.0 }
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["totalRows"], 4);
        assert_eq!(body["rows"].as_array().unwrap().len(), 2);
        assert_eq!(body["legend"][0]["label"], "90210");
        assert_eq!(body["legend"][0]["latest"], "$4,000,000");
        assert_eq!(body["legend"][0]["change"], "+33.33%");
        assert_eq!(body["selection"][0]["outcome"], "added");
        assert_eq!(body["selection"][1]["outcome"], "duplicate");
        assert!(body["selection"][3]["outcome"].is_null());
    }

    #[actix_web::test]
    async fn unmatched_metro_returns_hint() {
        let app = test::init_service(App::new().app_data(state()).service(api_scope())).await;
        let req = test::TestRequest::post()
            .uri("/api/series")
            .set_json(serde_json::json!({
                "locations": [{ "name": "Springfield, IL", "granularity": "metro" }],
                "variables": ["median_list_price"]
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["rows"].as_array().unwrap().len(), 0);
        assert_eq!(body["hint"], homescope_dashboard::COUNTY_HINT);
    }

    #[actix_web::test]
    async fn static_content_is_served() {
        let app = test::init_service(App::new().app_data(state()).service(api_scope())).await;

        let req = test::TestRequest::get().uri("/api/markets").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(!body["highest"].as_array().unwrap().is_empty());

        let req = test::TestRequest::get().uri("/api/forecast").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["cta"].is_string());

        let req = test::TestRequest::get()
            .uri("/api/forecast?subscribed=true")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["cta"].is_null());
        assert_eq!(body["hidden"], 0);
    }

    #[actix_web::test]
    async fn unconfigured_clients_are_unavailable() {
        let app = test::init_service(App::new().app_data(state()).service(api_scope())).await;

        let req = test::TestRequest::get()
            .uri("/api/places?input=aus")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let req = test::TestRequest::get()
            .uri("/api/auth/oauth/google")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let req = test::TestRequest::get()
            .uri("/api/auth/oauth/myspace")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
