use std::sync::Arc;

use actix_web::{error::InternalError, get, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::{
    error::{Error, Result},
    planner::{FuelPlanner, PlanResult},
    route::directions::RouteSource,
};

const MISSING_ADDRESSES: &str = "Start and finish addresses are required.";

pub struct AppState {
    pub routes: Arc<dyn RouteSource>,
    pub planner: Arc<FuelPlanner>,
}

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    #[serde(default)]
    start_address: Option<Value>,
    #[serde(default)]
    finish_address: Option<Value>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Only non-blank strings count as an address.
fn non_blank(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
        _ => None,
    }
}

#[post("/route-fuel-stops/")]
async fn route_fuel_stops(
    state: web::Data<AppState>,
    body: web::Json<RouteRequest>,
) -> impl Responder {
    let RouteRequest {
        start_address,
        finish_address,
    } = body.into_inner();

    let (Some(start), Some(finish)) = (non_blank(start_address), non_blank(finish_address)) else {
        return HttpResponse::BadRequest().json(ErrorBody::new(MISSING_ADDRESSES));
    };

    info!(%start, %finish, "planning fuel stops");

    let routes = state.routes.clone();
    let planner = state.planner.clone();
    let outcome = web::block(move || -> Result<PlanResult> {
        let route = routes.fetch_route(&start, &finish)?;
        planner.plan(&route)
    })
    .await
    .map_err(|e| Error::Blocking(e.to_string()))
    .and_then(|r| r);

    match outcome {
        Ok(plan) => HttpResponse::Ok().json(plan),
        Err(e) => {
            error!(error = %e, "fuel stop planning failed");
            HttpResponse::InternalServerError().json(ErrorBody::new(e.to_string()))
        }
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = ErrorBody::new(err.to_string());
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .service(route_fuel_stops),
    )
    .service(health);
}
