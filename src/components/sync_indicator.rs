// ============================================================================
// SYNC INDICATOR COMPONENT - Badge de sincronización entre pestañas
// ============================================================================

use yew::prelude::*;
use crate::hooks::use_sync_status;
use crate::services::ShipmentSynchronizer;
use crate::viewmodels::SyncViewModel;

#[derive(Properties, PartialEq)]
pub struct SyncStatusBadgeProps {
    pub sync: ShipmentSynchronizer,
}

#[function_component(SyncStatusBadge)]
pub fn sync_status_badge(props: &SyncStatusBadgeProps) -> Html {
    let status = use_sync_status(props.sync.clone());
    let badge = SyncViewModel::badge(&status);
    let title = SyncViewModel::last_update_label(&status);

    html! {
        <div class={badge.class} title={title}>
            <span class="sync-icon">{badge.icon}</span>
            <span class="sync-text">{badge.text}</span>
        </div>
    }
}
