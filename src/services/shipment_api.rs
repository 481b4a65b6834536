// ============================================================================
// SHIPMENT API - Cliente REST de envíos (stateless)
// ============================================================================
// NO tiene lógica de negocio: arma requests, valida lo mínimo y traduce
// los códigos HTTP a DashboardError.
// ============================================================================

use uuid::Uuid;
use crate::error::{DashboardError, DashboardResult};
use crate::models::grid::{GridQuery, GridState};
use crate::models::shipment::{BulkDeleteRequest, GridDataResponse, RefreshResponse, Shipment, ShipmentPatch};
use crate::services::http::{ApiRequest, ApiResponse, HttpBackend};

#[derive(Clone)]
pub struct ShipmentApi<H> {
    http: H,
}

impl<H: HttpBackend> ShipmentApi<H> {
    pub fn new(http: H) -> Self {
        Self { http }
    }

    /// Página del grid según filtros, orden y paginación
    pub async fn list(&self, state: &GridState) -> DashboardResult<GridDataResponse> {
        let query = GridQuery::from_state(state);
        let response = self
            .execute(ApiRequest::get(format!("/shipments?{}", query.to_query_string())), None)
            .await?;
        let page: GridDataResponse = response.json()?;
        log::info!("📦 [API] {} envíos recibidos (lastRow={})", page.rows.len(), page.last_row);
        Ok(page)
    }

    pub async fn get(&self, id: Uuid) -> DashboardResult<Shipment> {
        self.execute(ApiRequest::get(format!("/shipments/{}", id)), Some(id))
            .await?
            .json()
    }

    /// PATCH parcial; el patch se valida antes de mandar nada
    pub async fn update(&self, id: Uuid, patch: &ShipmentPatch) -> DashboardResult<Shipment> {
        let patch = patch.clone().validate()?;
        let request = ApiRequest::patch(format!("/shipments/{}", id)).with_json(&patch)?;
        log::info!("✏️ [API] Actualizando envío {}", id);
        self.execute(request, Some(id)).await?.json()
    }

    pub async fn delete(&self, id: Uuid) -> DashboardResult<()> {
        self.execute(ApiRequest::delete(format!("/shipments/{}", id)), Some(id))
            .await?;
        log::info!("🗑️ [API] Envío {} eliminado", id);
        Ok(())
    }

    pub async fn bulk_delete(&self, ids: &[Uuid]) -> DashboardResult<()> {
        if ids.is_empty() {
            return Err(DashboardError::Validation("no shipments selected".to_string()));
        }
        let request = ApiRequest::delete("/shipments:bulk").with_json(&BulkDeleteRequest {
            shipment_ids: ids.to_vec(),
        })?;
        self.execute(request, None).await?;
        log::info!("🗑️ [API] {} envíos eliminados", ids.len());
        Ok(())
    }

    /// Pide al backend que vuelva a consultar el tracking del envío
    pub async fn refresh(&self, id: Uuid) -> DashboardResult<Shipment> {
        let response = self
            .execute(ApiRequest::post(format!("/shipments/{}:refresh", id)), Some(id))
            .await?;
        let refreshed: RefreshResponse = response.json()?;
        Ok(refreshed.shipment)
    }

    async fn execute(&self, request: ApiRequest, subject: Option<Uuid>) -> DashboardResult<ApiResponse> {
        let response = self.http.send(request).await?;
        if response.status == 404 {
            return Err(DashboardError::NotFound(match subject {
                Some(id) => format!("Shipment {}", id),
                None => response.error_message(),
            }));
        }
        if response.is_success() {
            return Ok(response);
        }
        // 401 también es Http aquí: lo maneja la página (redirect a login)
        Err(DashboardError::Http {
            status: response.status,
            message: response.error_message(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grid::SortDirection;
    use crate::models::shipment::ShipmentStatus;
    use crate::services::http::{HttpMethod, ScriptedHttp};
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn shipment_json(id: Uuid) -> String {
        json!({
            "id": id,
            "shipment_number": "MSCU1234567",
            "shipping_status": "IN_TRANSIT",
            "coordinates": { "latitude": 1.29, "longitude": 103.85 }
        })
        .to_string()
    }

    #[test]
    fn list_builds_the_grid_query() {
        let id = Uuid::new_v4();
        let body = format!(r#"{{"rows":[{}],"lastRow":41}}"#, shipment_json(id));
        let http = ScriptedHttp::new().respond(200, &body);
        let api = ShipmentApi::new(http.clone());

        let mut state = GridState::default().with_sort("created_at", SortDirection::Desc);
        state.pagination.current_page = 3;
        let page = block_on(api.list(&state)).unwrap();

        assert_eq!(page.last_row, 41);
        assert_eq!(page.rows[0].status, ShipmentStatus::InTransit);
        assert_eq!(
            http.requests()[0].path,
            "/shipments?startRow=30&endRow=45&sort=-created_at"
        );
    }

    #[test]
    fn missing_shipment_is_not_found() {
        let http = ScriptedHttp::new().respond(404, r#"{"error":"record not found"}"#);
        let api = ShipmentApi::new(http);
        let err = block_on(api.get(Uuid::nil())).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn update_validates_before_sending() {
        let http = ScriptedHttp::new();
        let api = ShipmentApi::new(http.clone());

        let empty = block_on(api.update(Uuid::new_v4(), &ShipmentPatch::default()));
        assert!(matches!(empty, Err(DashboardError::Validation(_))));

        let too_long = ShipmentPatch { mbl: Some("X".repeat(101)), ..Default::default() };
        assert!(matches!(
            block_on(api.update(Uuid::new_v4(), &too_long)),
            Err(DashboardError::Validation(_))
        ));
        assert!(http.requests().is_empty());
    }

    #[test]
    fn update_sends_trimmed_camel_case_patch() {
        let id = Uuid::new_v4();
        let http = ScriptedHttp::new().respond(200, &shipment_json(id));
        let api = ShipmentApi::new(http.clone());
        let patch = ShipmentPatch {
            assigned_to: Some("  Ana  ".to_string()),
            invoiced: Some(true),
            ..Default::default()
        };

        let updated = block_on(api.update(id, &patch)).unwrap();

        assert_eq!(updated.id, id);
        let sent = &http.requests()[0];
        assert_eq!(sent.method, HttpMethod::Patch);
        let body: serde_json::Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"assignedTo": "Ana", "invoiced": true}));
    }

    #[test]
    fn bulk_delete_requires_ids() {
        let http = ScriptedHttp::new().respond(204, "");
        let api = ShipmentApi::new(http.clone());

        assert!(matches!(block_on(api.bulk_delete(&[])), Err(DashboardError::Validation(_))));
        assert!(http.requests().is_empty());

        let ids = [Uuid::new_v4(), Uuid::new_v4()];
        block_on(api.bulk_delete(&ids)).unwrap();
        let sent = &http.requests()[0];
        assert_eq!(sent.path, "/shipments:bulk");
        assert!(sent.body.as_deref().unwrap().contains("shipmentIDs"));
    }

    #[test]
    fn server_errors_carry_status_and_message() {
        let http = ScriptedHttp::new().respond(500, r#"{"error":"tracking provider timeout"}"#);
        let api = ShipmentApi::new(http);
        assert_eq!(
            block_on(api.refresh(Uuid::nil())),
            Err(DashboardError::Http { status: 500, message: "tracking provider timeout".to_string() })
        );
    }

    #[test]
    fn refresh_unwraps_the_shipment() {
        let id = Uuid::new_v4();
        let http = ScriptedHttp::new().respond(200, &format!(r#"{{"shipment":{}}}"#, shipment_json(id)));
        let api = ShipmentApi::new(http.clone());
        let shipment = block_on(api.refresh(id)).unwrap();
        assert_eq!(shipment.shipment_number, "MSCU1234567");
        assert_eq!(http.requests()[0].path, format!("/shipments/{}:refresh", id));
    }
}
