//! ALMG open-data portal integration.
//!
//! Two endpoints are used:
//! - the yearly proposition export (CSV, one file per year)
//! - the legislature list (JSON)
//!
//! Requests are blocking and are not retried; any non-success status is
//! reported to the caller.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::Settings;
use crate::domain::Legislature;
use crate::error::AppError;

const PROPOSITIONS_PATH: &str = "/arquivo/proposicoes/download";
const LEGISLATURES_PATH: &str = "/api/v2/legislaturas/lista";

pub struct AlmgClient {
    client: Client,
    base_url: String,
}

impl AlmgClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.base_url.clone())
    }

    pub fn propositions_url(&self) -> String {
        format!("{}{PROPOSITIONS_PATH}", self.base_url)
    }

    pub fn legislatures_url(&self) -> String {
        format!("{}{LEGISLATURES_PATH}", self.base_url)
    }

    /// Download the proposition export for `year` into memory.
    pub fn download_propositions_csv(&self, year: i32) -> Result<String, AppError> {
        log::info!("Downloading propositions for {year}");

        let resp = self
            .client
            .get(self.propositions_url())
            .query(&[("ano", year.to_string().as_str()), ("tipo", "CSV")])
            .send()
            .map_err(|e| AppError::new(4, format!("Proposition download for {year} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Proposition download for {year} failed with status {}.", resp.status()),
            ));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::new(4, format!("Failed to read proposition export for {year}: {e}")))?;

        log::info!("Downloaded {year} export ({} bytes)", body.len());
        Ok(body)
    }

    /// Fetch the list of legislatures.
    pub fn fetch_legislatures(&self) -> Result<Vec<Legislature>, AppError> {
        log::info!("Fetching legislature list");

        let resp = self
            .client
            .get(self.legislatures_url())
            .query(&[("formato", "json")])
            .send()
            .map_err(|e| AppError::new(4, format!("Legislature request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Legislature request failed with status {}.", resp.status()),
            ));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::new(4, format!("Failed to read legislature list: {e}")))?;
        let list = parse_legislatures(&body)?;

        log::debug!("Legislature list has {} entries", list.len());
        Ok(list)
    }
}

#[derive(Debug, Deserialize)]
struct LegislaturesResponse {
    #[serde(rename = "listaLegislatura", default)]
    lista_legislatura: Vec<Legislature>,
}

/// Decode a legislature list body.
pub fn parse_legislatures(json: &str) -> Result<Vec<Legislature>, AppError> {
    let body: LegislaturesResponse = serde_json::from_str(json)
        .map_err(|e| AppError::new(4, format!("Failed to parse legislature list: {e}")))?;
    Ok(body.lista_legislatura)
}
