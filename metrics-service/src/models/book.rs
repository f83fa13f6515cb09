use serde::{Deserialize, Serialize};

/// A single catalog entry as served by the external books API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub name: String,
    pub author: String,
    pub price: u64,
    #[serde(rename = "unitsSold")]
    pub units_sold: u64,
}
