// ============================================================================
// USE SYNC STATUS HOOK - Estado del synchronizer para componentes Yew
// ============================================================================

use futures::future::abortable;
use futures::StreamExt;
use yew::prelude::*;
use crate::services::ShipmentSynchronizer;
use crate::state::SyncStatus;

/// Re-renderiza con cada evento del synchronizer y con cada cambio de conexión
#[hook]
pub fn use_sync_status(sync: ShipmentSynchronizer) -> SyncStatus {
    let status = use_state(|| sync.status());

    {
        let status = status.clone();
        use_effect_with(sync, move |sync| {
            let connection = {
                let status = status.clone();
                let sync = sync.clone();
                sync.connection_state()
                    .subscribe(move |_| status.set(sync.status()))
            };

            let mut events = sync.subscribe();
            let sync = sync.clone();
            let (task, handle) = abortable(async move {
                while events.next().await.is_some() {
                    status.set(sync.status());
                }
            });
            wasm_bindgen_futures::spawn_local(async move {
                let _ = task.await;
            });

            move || {
                handle.abort();
                connection.unsubscribe();
            }
        });
    }

    (*status).clone()
}
