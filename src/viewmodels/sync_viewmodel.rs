// ============================================================================
// SYNC VIEWMODEL - Texto e icono del indicador de sincronización
// ============================================================================
// Devuelve valores, el componente sólo los pinta
// ============================================================================

use crate::state::SyncStatus;

#[derive(Clone, Debug, PartialEq)]
pub struct SyncBadge {
    pub icon: &'static str,
    pub text: String,
    pub class: &'static str,
}

pub struct SyncViewModel;

impl SyncViewModel {
    pub fn badge(status: &SyncStatus) -> SyncBadge {
        if !status.connected {
            return SyncBadge {
                icon: "📴",
                text: "Sync unavailable".to_string(),
                class: "sync-indicator offline",
            };
        }
        if !status.has_data {
            return SyncBadge {
                icon: "⏳",
                text: "Waiting for shipments".to_string(),
                class: "sync-indicator pending",
            };
        }

        let text = match status.selected_count {
            0 => format!("{} shipments synced", status.shipment_count),
            n => format!("{} shipments synced, {} selected", status.shipment_count, n),
        };
        SyncBadge {
            icon: "✅",
            text,
            class: "sync-indicator synced",
        }
    }

    /// Hora de la última actualización para el tooltip
    pub fn last_update_label(status: &SyncStatus) -> String {
        match status.last_update {
            Some(at) => format!("Last update {}", at.format("%H:%M:%S")),
            None => "No updates yet".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn status(connected: bool, shipments: usize, selected: usize) -> SyncStatus {
        SyncStatus {
            connected,
            has_data: shipments > 0,
            shipment_count: shipments,
            selected_count: selected,
            last_update: None,
            listener_count: 1,
        }
    }

    #[test]
    fn badge_reflects_connection_and_data() {
        assert_eq!(SyncViewModel::badge(&status(false, 4, 0)).class, "sync-indicator offline");
        assert_eq!(SyncViewModel::badge(&status(true, 0, 0)).icon, "⏳");
        assert_eq!(SyncViewModel::badge(&status(true, 12, 0)).text, "12 shipments synced");
        assert_eq!(SyncViewModel::badge(&status(true, 12, 2)).text, "12 shipments synced, 2 selected");
    }

    #[test]
    fn last_update_label_formats_time() {
        let mut s = status(true, 1, 0);
        assert_eq!(SyncViewModel::last_update_label(&s), "No updates yet");
        s.last_update = Some(Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 5).unwrap());
        assert_eq!(SyncViewModel::last_update_label(&s), "Last update 09:30:05");
    }
}
