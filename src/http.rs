//! HTTP front end.
//!
//! `GET /convert?amount=<amount>&currency=<code>` answers with JSON, or XML when the client sends
//! `Accept: application/xml`. Validation problems are 400s. When neither the cache nor the provider
//! can supply rates the client gets a 503 and the cause goes to the log.
use actix_web::{
    HttpRequest, HttpResponse, Responder,
    error::ResponseError,
    get,
    http::{
        StatusCode,
        header::{self, ContentType},
    },
    web,
};
use log::*;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    error::{ConvertError, RenderError},
    service::ConversionService,
};

const XML_MIME: &str = "application/xml";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Convert(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Convert(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match status {
            StatusCode::BAD_REQUEST => self.to_string(),
            StatusCode::SERVICE_UNAVAILABLE => {
                "Exchange rates are currently unavailable".to_string()
            }
            _ => "Internal server error".to_string(),
        };
        HttpResponse::build(status)
            .insert_header(ContentType::plaintext())
            .body(body)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConvertQuery {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(
        web::resource("/convert")
            .route(web::get().to(convert))
            .default_service(web::to(method_not_allowed)),
    );
}

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("Received health check request");
    HttpResponse::Ok().body("ok\n")
}

pub async fn convert(
    req: HttpRequest,
    query: web::Query<ConvertQuery>,
    service: web::Data<ConversionService>,
) -> Result<HttpResponse, ApiError> {
    let amount = query.amount.trim();
    let currency = query.currency.trim();
    trace!("Convert request for {amount} {currency}");
    let conversion = service.convert(amount, currency).await?;

    let accept = req.headers().get(header::ACCEPT).and_then(|v| v.to_str().ok());
    let wants_xml = accept == Some(XML_MIME);
    if wants_xml {
        let body = conversion.to_xml().inspect_err(log_render_error)?;
        Ok(HttpResponse::Ok().content_type(XML_MIME).body(body))
    } else {
        let body = conversion.to_json().inspect_err(log_render_error)?;
        Ok(HttpResponse::Ok().content_type(ContentType::json()).body(body))
    }
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header(ContentType::plaintext())
        .body("Method not allowed")
}

fn log_render_error(e: &RenderError) {
    error!("Could not render conversion. {e}");
}
