//! Google Sheets adapter: creates the report spreadsheet, writes the
//! rendered grid, and applies formatting (green background on "yes" cells,
//! auto-sized columns).

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{check_status, Authenticator, RemoteError, SheetPublisher};
use crate::core::PresenceMatrix;

const SHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

/// Leading non-data columns in the rendered grid ("Item", "Number")
const LABEL_COLUMNS: usize = 2;

/// Sheets-backed publisher
pub struct SheetsPublisher {
    auth: Arc<Authenticator>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    #[serde(rename = "spreadsheetId")]
    spreadsheet_id: String,
    sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    #[serde(rename = "sheetId")]
    sheet_id: i64,
}

impl SheetsPublisher {
    pub fn new(auth: Arc<Authenticator>) -> Self {
        Self {
            auth,
            client: reqwest::Client::new(),
        }
    }

    async fn create_spreadsheet(
        &self,
        token: &str,
        title: &str,
    ) -> Result<(String, i64), RemoteError> {
        let response = self
            .client
            .post(SHEETS_URL)
            .bearer_auth(token)
            .json(&json!({ "properties": { "title": title } }))
            .send()
            .await?;

        let created: CreateResponse = check_status(response).await?.json().await?;
        let sheet_id = created
            .sheets
            .first()
            .map(|s| s.properties.sheet_id)
            .unwrap_or(0);
        Ok((created.spreadsheet_id, sheet_id))
    }

    async fn write_grid(
        &self,
        token: &str,
        spreadsheet_id: &str,
        grid: &[Vec<String>],
    ) -> Result<(), RemoteError> {
        let url = format!("{SHEETS_URL}/{spreadsheet_id}/values/A1");
        let response = self
            .client
            .put(&url)
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({
                "range": "A1",
                "majorDimension": "ROWS",
                "values": grid,
            }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn apply_formatting(
        &self,
        token: &str,
        spreadsheet_id: &str,
        sheet_id: i64,
        column_count: usize,
    ) -> Result<(), RemoteError> {
        let url = format!("{SHEETS_URL}/{spreadsheet_id}:batchUpdate");
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "requests": formatting_requests(sheet_id, column_count) }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Move the new spreadsheet into the report folder
    async fn move_to_folder(
        &self,
        token: &str,
        spreadsheet_id: &str,
        folder_id: &str,
    ) -> Result<(), RemoteError> {
        let url = format!("{DRIVE_FILES_URL}/{spreadsheet_id}");
        let response = self
            .client
            .patch(&url)
            .bearer_auth(token)
            .query(&[("addParents", folder_id)])
            .json(&json!({}))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// batchUpdate requests: highlight "yes" cells green, auto-size columns
fn formatting_requests(sheet_id: i64, column_count: usize) -> serde_json::Value {
    json!([
        {
            "addConditionalFormatRule": {
                "rule": {
                    "ranges": [{
                        "sheetId": sheet_id,
                        "startRowIndex": 1,
                        "startColumnIndex": LABEL_COLUMNS,
                    }],
                    "booleanRule": {
                        "condition": {
                            "type": "TEXT_CONTAINS",
                            "values": [{ "userEnteredValue": "yes" }]
                        },
                        "format": {
                            "backgroundColor": { "red": 0.7, "green": 1, "blue": 0.7 }
                        }
                    }
                }
            }
        },
        {
            "autoResizeDimensions": {
                "dimensions": {
                    "sheetId": sheet_id,
                    "dimension": "COLUMNS",
                    "startIndex": 0,
                    "endIndex": column_count + LABEL_COLUMNS,
                }
            }
        }
    ])
}

#[async_trait]
impl SheetPublisher for SheetsPublisher {
    async fn publish(
        &self,
        matrix: &PresenceMatrix,
        parent_folder_id: &str,
        title: &str,
    ) -> Result<String, RemoteError> {
        let token = self.auth.access_token().await?;

        let (spreadsheet_id, sheet_id) = self.create_spreadsheet(&token, title).await?;
        self.write_grid(&token, &spreadsheet_id, &matrix.to_rows())
            .await?;
        self.apply_formatting(&token, &spreadsheet_id, sheet_id, matrix.columns().len())
            .await?;
        self.move_to_folder(&token, &spreadsheet_id, parent_folder_id)
            .await?;

        info!(%spreadsheet_id, title, "published availability matrix");
        Ok(spreadsheet_id)
    }
}
