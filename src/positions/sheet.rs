// Held-positions source: a public Google Sheet read through its CSV export.
use crate::model::{Position, PositionsError};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Status flag marking a position as currently held.
const OPEN_STATUS: &str = "OPEN";

#[async_trait::async_trait]
pub trait PositionsSource: Send + Sync {
    async fn fetch_open_positions(&self) -> Result<Vec<Position>, PositionsError>;
}

pub struct GoogleSheetSource {
    client: Client,
    sheet_url: String,
}

impl GoogleSheetSource {
    pub fn new(sheet_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to create HTTP client");
        Self { client, sheet_url }
    }

    fn csv_export_url(&self) -> String {
        if self.sheet_url.contains("/edit?") {
            self.sheet_url.replace("/edit?", "/export?")
        } else {
            format!("{}/export?format=csv", self.sheet_url.trim_end_matches('/'))
        }
    }

    /// Keeps only rows flagged OPEN; malformed rows are skipped, they never
    /// poison the rest of the sheet.
    fn parse_open_positions(text: &str) -> Vec<Position> {
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let mut positions = Vec::new();
        for record in reader.deserialize::<Position>() {
            match record {
                Ok(position) if position.status.eq_ignore_ascii_case(OPEN_STATUS) => {
                    positions.push(position);
                }
                Ok(_) => {}
                Err(e) => debug!("Skipping malformed position row: {}", e),
            }
        }
        positions
    }
}

#[async_trait::async_trait]
impl PositionsSource for GoogleSheetSource {
    async fn fetch_open_positions(&self) -> Result<Vec<Position>, PositionsError> {
        let url = self.csv_export_url();

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PositionsError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PositionsError::Http(format!("status {}", response.status())));
        }

        let text = response
            .text()
            .await
            .map_err(|e| PositionsError::Http(e.to_string()))?;
        Ok(Self::parse_open_positions(&text))
    }
}
