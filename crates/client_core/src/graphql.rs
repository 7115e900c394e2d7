//! GraphQL-over-HTTP implementations of the service traits.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use shared::{
    domain::{VehicleId, VehicleRecord},
    error::GraphQlFailure,
    protocol::{
        ExportVariables, ExportVehiclesData, GraphQlRequest, GraphQlResponse, PageVariables,
        RemoveVehicleData, RemoveVehicleVariables, SearchVariables, SearchVehicleData,
        UpdateVehicleData, UpdateVehicleInput, UpdateVehicleVariables, UploadCsvData,
        VehiclesData, EXPORT_BY_AGE_MUTATION, REMOVE_VEHICLE_MUTATION, SEARCH_VEHICLE_QUERY,
        UPDATE_VEHICLE_MUTATION, UPLOAD_CSV_MUTATION, VEHICLES_QUERY,
    },
};

use crate::{
    config::Settings, error::FetchError, paging::PageWindow, CsvUpload, ExportService, Gateways,
    ImportService, VehicleDirectory,
};

const CSV_MIME: &str = "text/csv";
const OPERATION_NAME_HEADER: &str = "x-apollo-operation-name";

/// Posts GraphQL documents to one endpoint.
#[derive(Clone)]
pub struct GraphQlClient {
    http: Client,
    endpoint: String,
}

impl GraphQlClient {
    pub fn new(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn execute<V, T>(
        &self,
        operation: &str,
        document: &str,
        variables: V,
    ) -> Result<T, FetchError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let request = GraphQlRequest::new(document, operation, variables);
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|source| self.transport_error(source))?;
        self.decode(operation, response).await
    }

    /// GraphQL multipart request: an `operations` part whose file variables are
    /// `null`, a `map` part pointing file parts at those variables, then the
    /// file parts themselves.
    pub async fn execute_upload<T>(
        &self,
        operation: &str,
        document: &str,
        upload: CsvUpload,
    ) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        let operations = json!({
            "query": document,
            "operationName": operation,
            "variables": { "file": null },
        });
        let map = json!({ "0": ["variables.file"] });
        let file = Part::bytes(upload.contents)
            .file_name(upload.file_name)
            .mime_str(CSV_MIME)
            .map_err(|source| self.transport_error(source))?;
        let form = Form::new()
            .text("operations", operations.to_string())
            .text("map", map.to_string())
            .part("0", file);

        let response = self
            .http
            .post(&self.endpoint)
            .header(OPERATION_NAME_HEADER, operation)
            .multipart(form)
            .send()
            .await
            .map_err(|source| self.transport_error(source))?;
        self.decode(operation, response).await
    }

    async fn decode<T>(&self, operation: &str, response: Response) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| self.transport_error(source))?;

        if !status.is_success() {
            // GraphQL servers commonly pair 4xx statuses with an `errors` body.
            return Err(
                match serde_json::from_slice::<GraphQlResponse<serde_json::Value>>(&body) {
                    Ok(parsed) if !parsed.errors.is_empty() => {
                        GraphQlFailure::new(operation, parsed.errors).into()
                    }
                    _ => FetchError::Status {
                        endpoint: self.endpoint.clone(),
                        status,
                    },
                },
            );
        }

        let parsed: GraphQlResponse<T> =
            serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
                operation: operation.to_string(),
                source,
            })?;
        if !parsed.errors.is_empty() {
            return Err(GraphQlFailure::new(operation, parsed.errors).into());
        }
        parsed.data.ok_or_else(|| FetchError::MissingData {
            operation: operation.to_string(),
        })
    }

    fn transport_error(&self, source: reqwest::Error) -> FetchError {
        FetchError::Transport {
            endpoint: self.endpoint.clone(),
            source,
        }
    }
}

pub struct GraphQlDirectory {
    client: GraphQlClient,
}

impl GraphQlDirectory {
    pub fn new(client: GraphQlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VehicleDirectory for GraphQlDirectory {
    async fn list_page(&self, window: PageWindow) -> Result<Vec<VehicleRecord>, FetchError> {
        let data: VehiclesData = self
            .client
            .execute(
                "vehicles",
                VEHICLES_QUERY,
                PageVariables {
                    limit: window.limit,
                    offset: window.offset,
                },
            )
            .await?;
        Ok(data.vehicles)
    }

    async fn search_page(
        &self,
        text: &str,
        window: PageWindow,
    ) -> Result<Vec<VehicleRecord>, FetchError> {
        let data: SearchVehicleData = self
            .client
            .execute(
                "searchVehicle",
                SEARCH_VEHICLE_QUERY,
                SearchVariables {
                    search: text.to_string(),
                    limit: window.limit,
                    offset: window.offset,
                },
            )
            .await?;
        Ok(data.search_vehicle)
    }

    async fn update_vehicle(&self, input: UpdateVehicleInput) -> Result<VehicleId, FetchError> {
        let data: UpdateVehicleData = self
            .client
            .execute(
                "updateVehicle",
                UPDATE_VEHICLE_MUTATION,
                UpdateVehicleVariables {
                    update_vehicle_input: input,
                },
            )
            .await?;
        Ok(data.update_vehicle.id)
    }

    async fn remove_vehicle(&self, id: VehicleId) -> Result<bool, FetchError> {
        let data: RemoveVehicleData = self
            .client
            .execute(
                "removeVehicle",
                REMOVE_VEHICLE_MUTATION,
                RemoveVehicleVariables { id },
            )
            .await?;
        Ok(data.remove_vehicle)
    }
}

pub struct GraphQlImporter {
    client: GraphQlClient,
}

impl GraphQlImporter {
    pub fn new(client: GraphQlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImportService for GraphQlImporter {
    async fn upload_csv(&self, upload: CsvUpload) -> Result<serde_json::Value, FetchError> {
        let data: UploadCsvData = self
            .client
            .execute_upload("uploadCsvFile", UPLOAD_CSV_MUTATION, upload)
            .await?;
        Ok(data.upload_csv_file)
    }
}

pub struct GraphQlExporter {
    client: GraphQlClient,
}

impl GraphQlExporter {
    pub fn new(client: GraphQlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExportService for GraphQlExporter {
    async fn export_by_age(&self, age: u32) -> Result<serde_json::Value, FetchError> {
        let data: ExportVehiclesData = self
            .client
            .execute(
                "exportVehiclesByAge",
                EXPORT_BY_AGE_MUTATION,
                ExportVariables { age },
            )
            .await?;
        Ok(data.export_vehicles_by_age)
    }
}

/// One HTTP connection pool shared by the three service clients.
pub fn graphql_gateways(settings: &Settings) -> anyhow::Result<Gateways> {
    let http = Client::builder()
        .timeout(settings.request_timeout())
        .build()
        .context("failed to build HTTP client")?;

    Ok(Gateways {
        directory: Arc::new(GraphQlDirectory::new(GraphQlClient::new(
            http.clone(),
            &settings.directory_url,
        ))),
        importer: Arc::new(GraphQlImporter::new(GraphQlClient::new(
            http.clone(),
            &settings.import_url,
        ))),
        exporter: Arc::new(GraphQlExporter::new(GraphQlClient::new(
            http,
            &settings.export_url,
        ))),
    })
}

#[cfg(test)]
#[path = "tests/graphql_tests.rs"]
mod tests;
