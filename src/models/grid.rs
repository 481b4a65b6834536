use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_PAGE_SIZE: u32 = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Orden de una columna (modelo de sort del grid)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortModel {
    pub col_id: String,
    pub sort: SortDirection,
}

/// Cursor de paginación (página 1-based)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Estado de la vista del grid: filtros + orden + columnas + paginación.
///
/// Los filtros y el estado de columnas son descriptores opacos de la librería
/// del grid; aquí solo se guardan y se comparan.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridState {
    #[serde(default)]
    pub filters: BTreeMap<String, Value>,
    #[serde(default)]
    pub sorting: Vec<SortModel>,
    #[serde(default)]
    pub columns: Vec<Value>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Merge superficial: solo las claves presentes reemplazan
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridStatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorting: Option<Vec<SortModel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl From<GridState> for GridStatePatch {
    fn from(state: GridState) -> Self {
        Self {
            filters: Some(state.filters),
            sorting: Some(state.sorting),
            columns: Some(state.columns),
            pagination: Some(state.pagination),
        }
    }
}

impl GridState {
    pub fn active_filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Sin filtros, sin orden y sin layout de columnas
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.sorting.is_empty() && self.columns.is_empty()
    }

    pub fn with_filter(mut self, column: &str, descriptor: Value) -> Self {
        self.filters.insert(column.to_string(), descriptor);
        self
    }

    pub fn with_sort(mut self, column: &str, sort: SortDirection) -> Self {
        self.sorting.push(SortModel {
            col_id: column.to_string(),
            sort,
        });
        self
    }

    pub fn merge(&mut self, patch: GridStatePatch) {
        if let Some(filters) = patch.filters {
            self.filters = filters;
        }
        if let Some(sorting) = patch.sorting {
            self.sorting = sorting;
        }
        if let Some(columns) = patch.columns {
            self.columns = columns;
        }
        if let Some(pagination) = patch.pagination {
            self.pagination = pagination;
        }
    }

    /// Descripción legible: "2 filters, 1 sort, custom column layout"
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();

        let filters = self.active_filter_count();
        if filters > 0 {
            parts.push(format!("{} filter{}", filters, plural(filters)));
        }
        if !self.sorting.is_empty() {
            parts.push(format!("{} sort{}", self.sorting.len(), plural(self.sorting.len())));
        }
        if !self.columns.is_empty() {
            parts.push("custom column layout".to_string());
        }

        if parts.is_empty() {
            "no filters".to_string()
        } else {
            parts.join(", ")
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Query de `GET /shipments` derivada del estado del grid
#[derive(Clone, Debug, PartialEq)]
pub struct GridQuery {
    pub start_row: u64,
    pub end_row: u64,
    pub sort: Option<String>,
    pub filter: Option<String>,
}

impl GridQuery {
    pub fn from_state(state: &GridState) -> Self {
        let page = state.pagination.current_page.max(1) as u64;
        let size = state.pagination.page_size.max(1) as u64;
        let start_row = (page - 1) * size;

        let sort = if state.sorting.is_empty() {
            None
        } else {
            Some(
                state
                    .sorting
                    .iter()
                    .map(|s| match s.sort {
                        SortDirection::Asc => s.col_id.clone(),
                        SortDirection::Desc => format!("-{}", s.col_id),
                    })
                    .collect::<Vec<_>>()
                    .join(","),
            )
        };

        let filter = if state.filters.is_empty() {
            None
        } else {
            serde_json::to_string(&state.filters).ok()
        };

        Self {
            start_row,
            end_row: start_row + size,
            sort,
            filter,
        }
    }

    pub fn to_query_string(&self) -> String {
        let mut params = vec![
            format!("startRow={}", self.start_row),
            format!("endRow={}", self.end_row),
        ];
        if let Some(sort) = &self.sort {
            params.push(format!("sort={}", encode_component(sort)));
        }
        if let Some(filter) = &self.filter {
            params.push(format!("filter={}", encode_component(filter)));
        }
        params.join("&")
    }
}

/// Percent-encoding de un componente de URL (RFC 3986, unreserved intactos)
pub fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn missing_fields_take_defaults() {
        let state: GridState = serde_json::from_str(r#"{"filters":{"status":"IN_TRANSIT"}}"#).unwrap();
        assert_eq!(state.active_filter_count(), 1);
        assert_eq!(state.pagination, Pagination { current_page: 1, page_size: 15 });
        assert!(state.sorting.is_empty());
    }

    #[test]
    fn merge_only_replaces_present_keys() {
        let mut state = GridState::default()
            .with_filter("status", json!("IN_TRANSIT"))
            .with_sort("updatedAt", SortDirection::Desc);

        state.merge(GridStatePatch {
            pagination: Some(Pagination { current_page: 3, page_size: 15 }),
            ..Default::default()
        });

        assert_eq!(state.pagination.current_page, 3);
        assert_eq!(state.filters.get("status"), Some(&json!("IN_TRANSIT")));
        assert_eq!(state.sorting.len(), 1);
    }

    #[test]
    fn describe_summarises_state() {
        assert_eq!(GridState::default().describe(), "no filters");
        let state = GridState::default()
            .with_filter("status", json!("IN_TRANSIT"))
            .with_filter("sealineCode", json!({"values": ["MAEU"]}))
            .with_sort("updatedAt", SortDirection::Desc);
        assert_eq!(state.describe(), "2 filters, 1 sort");
    }

    #[test]
    fn query_string_encodes_paging_sort_and_filter() {
        let mut state = GridState::default()
            .with_filter("status", json!("IN_TRANSIT"))
            .with_sort("updatedAt", SortDirection::Desc);
        state.pagination = Pagination { current_page: 2, page_size: 20 };

        let query = GridQuery::from_state(&state);
        assert_eq!(query.start_row, 20);
        assert_eq!(query.end_row, 40);
        assert_eq!(query.sort.as_deref(), Some("-updatedAt"));
        assert_eq!(
            query.to_query_string(),
            "startRow=20&endRow=40&sort=-updatedAt&filter=%7B%22status%22%3A%22IN_TRANSIT%22%7D"
        );
    }

    #[test]
    fn encode_component_keeps_unreserved() {
        assert_eq!(encode_component("Asia Lane"), "Asia%20Lane");
        assert_eq!(encode_component("a-b_c.d~"), "a-b_c.d~");
    }
}
