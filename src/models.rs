use crate::dashboard::Panel;
use crate::endpoints::EndpointRole;
use crate::table::Cell;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TableResponse {
    pub endpoint: EndpointRole,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub error: Option<String>,
}

impl From<Panel> for TableResponse {
    fn from(panel: Panel) -> Self {
        Self {
            endpoint: panel.endpoint.role,
            columns: panel.table.columns.clone(),
            rows: panel.table.rows.clone(),
            error: panel.error,
        }
    }
}
