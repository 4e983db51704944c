/// WebSocket message types for client-server communication
use serde::{Deserialize, Serialize};

use crate::aggregate::Summary;
use crate::content::Row;
use crate::query::{DerivedView, QuerySpec};

/// Messages sent from client to server
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Subscribe to edits on a table
    Subscribe { table_name: String },

    /// List loaded tables
    ListTables,

    /// Load (or replace) a table from CSV text
    LoadCsv { table_name: String, csv: String },

    /// Compute a derived view
    Query {
        table_name: String,
        #[serde(default)]
        spec: QuerySpec,
    },

    /// Update a single cell, addressed by original row index
    UpdateCell {
        table_name: String,
        row_index: usize,
        column: String,
        value: String,
    },
}

/// Messages sent from server to client
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Subscription confirmed
    Subscribed { table_name: String },

    /// Names of the loaded tables
    Tables { names: Vec<String> },

    /// A table was loaded
    TableLoaded {
        table_name: String,
        columns: Vec<String>,
        row_count: usize,
    },

    /// Derived view in response to Query
    View {
        table_name: String,
        columns: Vec<String>,
        rows: Vec<Row>,
        summary: Summary,
        total_rows: usize,
    },

    /// A cell was updated
    CellUpdated {
        table_name: String,
        row_index: usize,
        column: String,
        value: String,
    },

    /// Error occurred
    Error { message: String },
}

impl ServerMessage {
    pub fn view(table_name: String, columns: Vec<String>, view: DerivedView<'_>) -> Self {
        ServerMessage::View {
            table_name,
            columns,
            rows: view.visible_rows.into_iter().cloned().collect(),
            summary: view.summary,
            total_rows: view.total_rows,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}
