// =====================================================
// BigQuery REST OPERATIONS (tables.get / tabledata.list)
// =====================================================

use crate::data_transfer::error::SourceError;
use crate::data_transfer::models::{SourceRow, TableRef};
use crate::data_transfer::source::{project_native_order, PageSource};
use crate::db_types::BigQueryConnectionConfig;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

pub const DEFAULT_API_BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

// --- Wire types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableDataListResponse {
    #[serde(default)]
    rows: Vec<SourceRow>,
    #[serde(default)]
    page_token: Option<String>,
}

/// One `tabledata.list` response. BigQuery may stop short of `maxResults`
/// and hand back a token for the rest.
#[derive(Debug, Default, PartialEq)]
pub struct ListRowsChunk {
    pub rows: Vec<SourceRow>,
    pub page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TableResource {
    schema: Option<TableSchema>,
}

#[derive(Debug, Deserialize)]
struct TableSchema {
    #[serde(default)]
    fields: Vec<TableFieldSchema>,
}

#[derive(Debug, Deserialize)]
struct TableFieldSchema {
    name: String,
}

// --- Client ---

#[derive(Clone)]
pub struct BigQueryClient {
    http: reqwest::Client,
    project_id: String,
    api_base_url: String,
    access_token: Option<String>,
}

impl BigQueryClient {
    pub fn new(
        config: &BigQueryConnectionConfig,
        access_token: Option<String>,
    ) -> Result<Self, String> {
        let project_id = config.project_id.trim();
        if project_id.is_empty() {
            return Err("BigQuery connection requires a project_id".to_string());
        }

        Url::parse(config.api_base_url.trim())
            .map_err(|e| format!("Invalid BigQuery api_base_url '{}': {}", config.api_base_url, e))?;

        Ok(Self {
            http: reqwest::Client::new(),
            project_id: project_id.to_string(),
            api_base_url: config.api_base_url.trim().to_string(),
            access_token,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    async fn get_text(&self, url: Url) -> Result<String, SourceError> {
        let mut rb = self.http.get(url);
        if let Some(token) = &self.access_token {
            rb = rb.bearer_auth(token);
        }

        let response = rb.send().await?;
        let status = response.status();
        if !status.is_success() {
            let err_body = response.text().await.unwrap_or_default();
            return Err(SourceError::Request(format!(
                "BigQuery error ({}): {}",
                status, err_body
            )));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageSource for BigQueryClient {
    async fn column_order(
        &self,
        table: &TableRef,
        projection: Option<&[String]>,
    ) -> Result<Vec<String>, SourceError> {
        let url = build_table_url(&self.api_base_url, &self.project_id, table)?;
        let body = self.get_text(url).await?;
        decode_column_order(&body, projection)
    }

    async fn list_rows(
        &self,
        table: &TableRef,
        projection: Option<&[String]>,
        max_results: usize,
        start_index: u64,
    ) -> Result<Vec<SourceRow>, SourceError> {
        let mut rows = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let remaining = max_results.saturating_sub(rows.len());
            let url = build_list_rows_url(
                &self.api_base_url,
                &self.project_id,
                table,
                projection,
                remaining,
                start_index,
                page_token.as_deref(),
            )?;
            let chunk = decode_list_rows(&self.get_text(url).await?)?;
            rows.extend(chunk.rows);

            match chunk.page_token {
                Some(next) if rows.len() < max_results => {
                    if page_token.as_deref() == Some(next.as_str()) {
                        return Err(SourceError::Malformed(format!(
                            "tabledata.list for {} returned page token '{}' twice",
                            table, next
                        )));
                    }
                    log::debug!(
                        "Following page token for {} ({} of {} rows read)",
                        table,
                        rows.len(),
                        max_results
                    );
                    page_token = Some(next);
                }
                _ => return Ok(rows),
            }
        }
    }
}

// --- Request building ---

pub fn build_table_url(
    api_base_url: &str,
    project_id: &str,
    table: &TableRef,
) -> Result<Url, SourceError> {
    let mut url = Url::parse(api_base_url)
        .map_err(|e| SourceError::Request(format!("Invalid BigQuery URL: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| SourceError::Request(format!("BigQuery URL '{}' cannot take a path", api_base_url)))?
        .pop_if_empty()
        .extend([
            "projects",
            project_id,
            "datasets",
            table.namespace(),
            "tables",
            table.name(),
        ]);
    Ok(url)
}

pub fn build_list_rows_url(
    api_base_url: &str,
    project_id: &str,
    table: &TableRef,
    projection: Option<&[String]>,
    max_results: usize,
    start_index: u64,
    page_token: Option<&str>,
) -> Result<Url, SourceError> {
    let mut url = build_table_url(api_base_url, project_id, table)?;
    url.path_segments_mut()
        .map_err(|_| SourceError::Request(format!("BigQuery URL '{}' cannot take a path", api_base_url)))?
        .push("data");

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("maxResults", &max_results.to_string());
        // a continuation token already encodes the position
        match page_token {
            Some(token) => query.append_pair("pageToken", token),
            None => query.append_pair("startIndex", &start_index.to_string()),
        };
        if let Some(fields) = projection.filter(|fields| !fields.is_empty()) {
            query.append_pair("selectedFields", &fields.join(","));
        }
    }

    Ok(url)
}

// --- Response decoding ---

pub fn decode_list_rows(body: &str) -> Result<ListRowsChunk, SourceError> {
    serde_json::from_str::<TableDataListResponse>(body)
        .map(|response| ListRowsChunk {
            rows: response.rows,
            page_token: response.page_token.filter(|token| !token.is_empty()),
        })
        .map_err(|e| SourceError::Malformed(format!("Failed to parse tabledata.list response: {}", e)))
}

pub fn decode_column_order(
    body: &str,
    projection: Option<&[String]>,
) -> Result<Vec<String>, SourceError> {
    let table = serde_json::from_str::<TableResource>(body)
        .map_err(|e| SourceError::Malformed(format!("Failed to parse tables.get response: {}", e)))?;

    let native = table
        .schema
        .map(|schema| {
            schema
                .fields
                .into_iter()
                .map(|field| field.name)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if native.is_empty() {
        return Err(SourceError::Malformed(
            "Table resource has no schema fields".to_string(),
        ));
    }

    project_native_order(&native, projection)
}
