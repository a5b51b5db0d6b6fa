use serde::{Deserialize, Deserializer, Serialize};

/// A latitude/longitude pair in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Request body for `POST {base}/resources`.
pub type LocationPayload = Coordinates;

/// One emergency service entry (shelter, clinic, ...) as returned by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub phone: Option<String>,
    #[serde(rename = "distance")]
    pub distance_km: f64,
}

/// Resources in the order the backend returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceQueryResult {
    pub resources: Vec<ResourceRecord>,
}

impl ResourceQueryResult {
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Wire shape of a successful lookup. Fields the backend adds besides
/// `resources` (`success`, per-record `id`, coordinates) are ignored.
#[derive(Debug, Deserialize)]
pub struct ResourcesResponse {
    pub resources: Vec<ResourceRecord>,
}

impl From<ResourcesResponse> for ResourceQueryResult {
    fn from(res: ResourcesResponse) -> Self {
        Self {
            resources: res.resources,
        }
    }
}

/// Wire shape of `GET {base}/health`.
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

// The backend stores phone as a nullable column and sometimes sends "".
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|p| !p.trim().is_empty()))
}
