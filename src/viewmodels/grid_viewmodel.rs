// ============================================================================
// GRID VIEWMODEL - Filas y selección del grid de envíos
// ============================================================================

use std::collections::HashSet;
use serde::Serialize;
use uuid::Uuid;
use crate::models::broadcast::MapBounds;
use crate::models::shipment::Shipment;

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub id: Uuid,
    pub shipment_number: String,
    pub sealine: String,
    pub status_label: String,
    pub badge_classes: String,
    pub selected: bool,
}

pub struct GridViewModel;

impl GridViewModel {
    pub fn rows(visible: &[Shipment], selected: &[Uuid]) -> Vec<GridRow> {
        let selected: HashSet<&Uuid> = selected.iter().collect();
        visible
            .iter()
            .map(|s| GridRow {
                id: s.id,
                shipment_number: s.shipment_number.clone(),
                sealine: if s.sealine_name.is_empty() {
                    s.sealine_code.clone()
                } else {
                    s.sealine_name.clone()
                },
                status_label: s.status.label().to_string(),
                badge_classes: s.status.badge_classes().to_string(),
                selected: selected.contains(&s.id),
            })
            .collect()
    }

    /// Envíos seleccionados, en el orden del grid
    pub fn selected_from_ids<'a>(visible: &'a [Shipment], ids: &[Uuid]) -> Vec<&'a Shipment> {
        let ids: HashSet<&Uuid> = ids.iter().collect();
        visible.iter().filter(|s| ids.contains(&s.id)).collect()
    }

    /// Ids de los envíos que caen dentro del área visible del mapa
    pub fn visible_after_filter(visible: &[Shipment], bounds: &MapBounds) -> Vec<Uuid> {
        visible
            .iter()
            .filter(|s| s.has_valid_coordinates())
            .filter(|s| s.coordinates.map_or(false, |c| bounds.contains(&c)))
            .map(|s| s.id)
            .collect()
    }

    pub fn selection_summary(selected: usize, total: usize) -> String {
        match selected {
            0 => format!("{} shipments", total),
            n => format!("{} of {} selected", n, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::shipment::{Coordinates, ShipmentStatus};

    fn fleet() -> Vec<Shipment> {
        let mut singapore = Shipment::new(Uuid::new_v4(), "SG1", ShipmentStatus::InTransit).with_coordinates(1.29, 103.85);
        singapore.sealine_code = "MSCU".to_string();
        let mut rotterdam = Shipment::new(Uuid::new_v4(), "NL1", ShipmentStatus::Delivered).with_coordinates(51.9, 4.4);
        rotterdam.sealine_name = "Maersk".to_string();
        let unplaced = Shipment::new(Uuid::new_v4(), "XX1", ShipmentStatus::Unknown);
        vec![singapore, rotterdam, unplaced]
    }

    #[test]
    fn rows_carry_labels_and_selection() {
        let ships = fleet();
        let rows = GridViewModel::rows(&ships, &[ships[1].id]);
        assert_eq!(rows[0].sealine, "MSCU");
        assert_eq!(rows[1].sealine, "Maersk");
        assert_eq!(rows[1].status_label, "Delivered");
        assert_eq!(rows[1].badge_classes, "bg-green-100 text-green-800");
        assert!(rows[1].selected && !rows[0].selected);
    }

    #[test]
    fn selection_keeps_grid_order() {
        let ships = fleet();
        let picked = GridViewModel::selected_from_ids(&ships, &[ships[2].id, ships[0].id, Uuid::new_v4()]);
        let numbers: Vec<&str> = picked.iter().map(|s| s.shipment_number.as_str()).collect();
        assert_eq!(numbers, vec!["SG1", "XX1"]);
    }

    #[test]
    fn bounds_filter_ignores_unplaced_shipments() {
        let ships = fleet();
        let asia = MapBounds {
            south_west: Coordinates::from((-10.0, 90.0)),
            north_east: Coordinates::from((40.0, 130.0)),
        };
        assert_eq!(GridViewModel::visible_after_filter(&ships, &asia), vec![ships[0].id]);
    }

    #[test]
    fn summary_text() {
        assert_eq!(GridViewModel::selection_summary(0, 12), "12 shipments");
        assert_eq!(GridViewModel::selection_summary(3, 12), "3 of 12 selected");
    }
}
