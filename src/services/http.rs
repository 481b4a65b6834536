// ============================================================================
// HTTP BACKEND - Transporte HTTP (stateless) para los clientes REST
// ============================================================================
// Los clientes (ShipmentApi, RemoteFilterStore) arman requests; el backend
// sólo los manda. En el navegador es gloo-net, en tests un guion en memoria.
// ============================================================================

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use serde::{Serialize, de::DeserializeOwned};
use crate::error::{DashboardError, DashboardResult};
use crate::models::shipment::ApiErrorBody;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Relativo a la URL base, con query incluida
    pub path: String,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: HttpMethod::Get, path: path.into(), body: None }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self { method: HttpMethod::Delete, path: path.into(), body: None }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self { method: HttpMethod::Post, path: path.into(), body: None }
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self { method: HttpMethod::Patch, path: path.into(), body: None }
    }

    pub fn with_json<T: Serialize>(mut self, body: &T) -> DashboardResult<Self> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> DashboardResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Mensaje del sobre `{ "error": ... }`; si no hay, el cuerpo tal cual
    pub fn error_message(&self) -> String {
        match serde_json::from_str::<ApiErrorBody>(&self.body) {
            Ok(envelope) => envelope.error,
            Err(_) if self.body.trim().is_empty() => format!("HTTP {}", self.status),
            Err(_) => self.body.trim().to_string(),
        }
    }

    /// Non-2xx a error tipado (404 => NotFound, 401 => Unauthorized)
    pub fn into_result(self) -> DashboardResult<Self> {
        match self.status {
            s if (200..300).contains(&s) => Ok(self),
            401 => Err(DashboardError::Unauthorized),
            404 => Err(DashboardError::NotFound(self.error_message())),
            status => Err(DashboardError::Http {
                status,
                message: self.error_message(),
            }),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait HttpBackend {
    async fn send(&self, request: ApiRequest) -> DashboardResult<ApiResponse>;
}

// ============================================================================
// BACKEND GUIONADO - respuestas en orden, registra cada request
// ============================================================================

/// Backend HTTP en memoria. Cada `send` consume la siguiente respuesta del
/// guion; sin respuestas pendientes devuelve `Network`.
#[derive(Clone, Default)]
pub struct ScriptedHttp {
    responses: Rc<RefCell<VecDeque<DashboardResult<ApiResponse>>>>,
    requests: Rc<RefCell<Vec<ApiRequest>>>,
}

impl ScriptedHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Ok(ApiResponse::new(status, body)));
        self
    }

    pub fn fail(self, error: DashboardError) -> Self {
        self.responses.borrow_mut().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn pending(&self) -> usize {
        self.responses.borrow().len()
    }
}

impl HttpBackend for ScriptedHttp {
    async fn send(&self, request: ApiRequest) -> DashboardResult<ApiResponse> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(DashboardError::Network("no scripted response".to_string())))
    }
}

// ============================================================================
// GLOO-NET (navegador)
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use browser::GlooHttp;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::*;
    use gloo_net::http::Request;
    use web_sys::RequestCredentials;

    /// Cliente HTTP del navegador. Manda cookies (`credentials: include`).
    #[derive(Clone)]
    pub struct GlooHttp {
        base_url: String,
    }

    impl GlooHttp {
        pub fn new(base_url: &str) -> Self {
            Self {
                base_url: base_url.trim_end_matches('/').to_string(),
            }
        }
    }

    impl HttpBackend for GlooHttp {
        async fn send(&self, request: ApiRequest) -> DashboardResult<ApiResponse> {
            let url = format!("{}{}", self.base_url, request.path);
            log::debug!("🌐 [HTTP] {} {}", request.method.as_str(), url);

            let builder = match request.method {
                HttpMethod::Get => Request::get(&url),
                HttpMethod::Post => Request::post(&url),
                HttpMethod::Patch => Request::patch(&url),
                HttpMethod::Delete => Request::delete(&url),
            }
            .credentials(RequestCredentials::Include);

            let prepared = match request.body {
                Some(body) => builder.header("Content-Type", "application/json").body(body),
                None => builder.build(),
            }
            .map_err(|e| DashboardError::Network(format!("Request error: {}", e)))?;

            let response = prepared
                .send()
                .await
                .map_err(|e| DashboardError::Network(format!("Network error: {}", e)))?;

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if !(200..300).contains(&status) {
                log::warn!("⚠️ [HTTP] {} {} -> {}", request.method.as_str(), url, status);
            }
            Ok(ApiResponse { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn error_message_prefers_the_envelope() {
        assert_eq!(ApiResponse::new(400, r#"{"error":"bad sort"}"#).error_message(), "bad sort");
        assert_eq!(ApiResponse::new(502, "upstream down\n").error_message(), "upstream down");
        assert_eq!(ApiResponse::new(500, "").error_message(), "HTTP 500");
    }

    #[test]
    fn status_codes_map_to_errors() {
        assert!(ApiResponse::new(204, "").into_result().is_ok());
        assert_eq!(ApiResponse::new(401, "").into_result(), Err(DashboardError::Unauthorized));
        assert!(ApiResponse::new(404, r#"{"error":"x"}"#).into_result().unwrap_err().is_not_found());
        assert_eq!(
            ApiResponse::new(409, r#"{"error":"conflict"}"#).into_result(),
            Err(DashboardError::Http { status: 409, message: "conflict".to_string() })
        );
    }

    #[test]
    fn scripted_backend_replays_in_order() {
        let http = ScriptedHttp::new().respond(200, "[]").respond(500, "boom");
        let first = block_on(http.send(ApiRequest::get("/a"))).unwrap();
        let second = block_on(http.send(ApiRequest::delete("/b"))).unwrap();
        let third = block_on(http.send(ApiRequest::get("/c")));

        assert_eq!(first.status, 200);
        assert_eq!(second.status, 500);
        assert!(matches!(third, Err(DashboardError::Network(_))));
        assert_eq!(http.requests().len(), 3);
        assert_eq!(http.requests()[1].method, HttpMethod::Delete);
    }
}
