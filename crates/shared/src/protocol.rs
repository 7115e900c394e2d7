use serde::{Deserialize, Serialize};

use crate::{
    domain::{VehicleId, VehicleRecord},
    error::GraphQlError,
};

macro_rules! vehicle_fields {
    () => {
        "id first_name last_name email car_make car_model vin manufactured_date age_of_vehicle"
    };
}

pub const VEHICLES_QUERY: &str = concat!(
    "query vehicles($limit: Int, $offset: Int) { ",
    "vehicles(limit: $limit, offset: $offset) { ",
    vehicle_fields!(),
    " } }"
);

pub const SEARCH_VEHICLE_QUERY: &str = concat!(
    "query searchVehicle($search: String, $limit: Int, $offset: Int) { ",
    "searchVehicle(search: $search, limit: $limit, offset: $offset) { ",
    vehicle_fields!(),
    " } }"
);

pub const UPDATE_VEHICLE_MUTATION: &str = concat!(
    "mutation updateVehicle($updateVehicleInput: UpdateVehicleInput!) { ",
    "updateVehicle(updateVehicleInput: $updateVehicleInput) { id } }"
);

pub const REMOVE_VEHICLE_MUTATION: &str =
    "mutation removeVehicle($id: Int!) { removeVehicle(id: $id) }";

pub const UPLOAD_CSV_MUTATION: &str =
    "mutation uploadCsvFile($file: Upload!) { uploadCsvFile(file: $file) }";

pub const EXPORT_BY_AGE_MUTATION: &str =
    "mutation exportVehiclesByAge($age: Int) { exportVehiclesByAge(age: $age) }";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlRequest<V> {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "operationName")]
    pub operation_name: Option<String>,
    pub variables: V,
}

impl<V> GraphQlRequest<V> {
    pub fn new(query: &str, operation_name: &str, variables: V) -> Self {
        Self {
            query: query.to_string(),
            operation_name: Some(operation_name.to_string()),
            variables,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageVariables {
    pub limit: u32,
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchVariables {
    pub search: String,
    pub limit: u32,
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateVehicleInput {
    pub id: VehicleId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleVariables {
    pub update_vehicle_input: UpdateVehicleInput,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RemoveVehicleVariables {
    pub id: VehicleId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExportVariables {
    pub age: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehiclesData {
    pub vehicles: Vec<VehicleRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchVehicleData {
    pub search_vehicle: Vec<VehicleRecord>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdatedVehicle {
    pub id: VehicleId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleData {
    pub update_vehicle: UpdatedVehicle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveVehicleData {
    pub remove_vehicle: bool,
}

/// The import and export services answer with a scalar whose shape is not
/// part of the contract, so it is kept as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCsvData {
    pub upload_csv_file: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportVehiclesData {
    pub export_vehicles_by_age: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_documents_select_every_wire_field() {
        for document in [VEHICLES_QUERY, SEARCH_VEHICLE_QUERY] {
            assert!(document.contains(vehicle_fields!()), "{document}");
        }
    }

    #[test]
    fn update_variables_use_graphql_argument_name() {
        let variables = UpdateVehicleVariables {
            update_vehicle_input: UpdateVehicleInput {
                id: VehicleId(4),
                first_name: "Grace".into(),
                last_name: "Hopper".into(),
                email: "grace@navy.mil".into(),
            },
        };
        let json = serde_json::to_value(&variables).expect("encode");
        assert_eq!(json["updateVehicleInput"]["id"], 4);
        assert_eq!(json["updateVehicleInput"]["first_name"], "Grace");
    }

    #[test]
    fn response_without_data_decodes_errors() {
        let response: GraphQlResponse<VehiclesData> = serde_json::from_value(serde_json::json!({
            "errors": [{ "message": "boom", "path": ["vehicles"] }]
        }))
        .expect("decode");
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].message, "boom");
    }

    #[test]
    fn response_data_decodes_without_default_payload() {
        let response: GraphQlResponse<VehiclesData> = serde_json::from_value(serde_json::json!({
            "data": { "vehicles": [] }
        }))
        .expect("decode");
        assert!(response.errors.is_empty());
        assert_eq!(response.data.map(|data| data.vehicles.len()), Some(0));

        let response: GraphQlResponse<RemoveVehicleData> =
            serde_json::from_value(serde_json::json!({ "data": null })).expect("decode null");
        assert!(response.data.is_none());
    }
}
