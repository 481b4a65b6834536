use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use crate::error::{DashboardError, DashboardResult};
use crate::models::grid::GridState;

pub const FILTER_NAME_MAX_CHARS: usize = 50;
pub const FILTER_FORMAT_VERSION: &str = "1.0";

/// Puntuación básica permitida además de letras, dígitos y espacio
const ALLOWED_PUNCTUATION: &[char] = &['-', '_', '.', ',', '(', ')', '\'', '&', '!', '#', '+'];

/// Filtro guardado: nombre + snapshot del estado del grid
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilter {
    pub name: String,
    pub state: GridState,
    pub saved_at: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    FILTER_FORMAT_VERSION.to_string()
}

impl SavedFilter {
    pub fn new(name: String, state: GridState, saved_at: DateTime<Utc>) -> Self {
        Self {
            name,
            state,
            saved_at,
            version: default_version(),
        }
    }

    /// Texto de la opción del dropdown: "Asia Lane (1 filter)"
    pub fn display_label(&self) -> String {
        match self.state.active_filter_count() {
            0 => self.name.clone(),
            1 => format!("{} (1 filter)", self.name),
            n => format!("{} ({} filters)", self.name, n),
        }
    }
}

/// Formato del fichero de export
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterExport {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub filter_count: usize,
    pub filters: BTreeMap<String, SavedFilter>,
}

impl FilterExport {
    pub fn new(filters: Vec<SavedFilter>, export_date: DateTime<Utc>) -> Self {
        let filters: BTreeMap<String, SavedFilter> = filters
            .into_iter()
            .map(|f| (f.name.clone(), f))
            .collect();
        Self {
            version: default_version(),
            export_date,
            filter_count: filters.len(),
            filters,
        }
    }

    /// Nombre sugerido para la descarga
    pub fn file_name(&self) -> String {
        format!("shipment-filters-{}.json", self.export_date.format("%Y-%m-%d"))
    }
}

/// Resultado de un import: contadores por entrada
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportReport {
    pub added: usize,
    pub overwritten: usize,
    pub failed: usize,
    pub failures: Vec<(String, String)>,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.added + self.overwritten
    }

    pub fn record_failure(&mut self, name: &str, reason: String) {
        self.failed += 1;
        self.failures.push((name.to_string(), reason));
    }

    pub fn summary(&self) -> String {
        let imported = self.imported();
        if self.failed == 0 {
            format!("Successfully imported {} filter{}!", imported, plural(imported))
        } else {
            format!(
                "Imported {} filter{} with {} error{}.",
                imported,
                plural(imported),
                self.failed,
                plural(self.failed)
            )
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterStats {
    pub total_filters: usize,
}

/// Valida y normaliza (trim) el nombre de un filtro
pub fn validate_filter_name(raw: &str) -> DashboardResult<String> {
    let name = raw.trim();

    if name.is_empty() {
        return Err(DashboardError::Validation("Filter name cannot be empty.".to_string()));
    }

    if name.chars().count() > FILTER_NAME_MAX_CHARS {
        return Err(DashboardError::Validation(format!(
            "Filter name must be at most {} characters.",
            FILTER_NAME_MAX_CHARS
        )));
    }

    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_alphanumeric() || *c == ' ' || ALLOWED_PUNCTUATION.contains(c)))
    {
        return Err(DashboardError::Validation(format!(
            "Filter name contains an invalid character: '{}'",
            bad
        )));
    }

    Ok(name.to_string())
}
