//! JSON response types and formatting for CLI output.

use serde::Serialize;

/// Response for a successful save.
#[derive(Serialize)]
pub struct SaveResponse {
    pub status: String,
    pub id: String,
}

/// Response for search results.
#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
}

/// Individual search result item.
#[derive(Serialize)]
pub struct SearchResultItem {
    pub id: String,
    pub text: String,
    pub relevance: f64,
    pub created_at: String,
}

/// Response for retrieving a specific record.
#[derive(Serialize)]
pub struct GetResponse {
    pub id: String,
    pub text: String,
    pub collection: String,
    pub metadata: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Response for listing records.
#[derive(Serialize)]
pub struct ListResponse {
    pub records: Vec<ListItem>,
}

/// Individual list item.
#[derive(Serialize)]
pub struct ListItem {
    pub id: String,
    pub text: String,
    pub created_at: String,
}

/// Response for a successful delete.
#[derive(Serialize)]
pub struct DeleteResponse {
    pub status: String,
    pub id: String,
}

/// Response for collection operations.
#[derive(Serialize)]
pub struct CollectionResponse {
    pub status: String,
    pub collection: String,
}

/// Response for collection existence checks.
#[derive(Serialize)]
pub struct ExistsResponse {
    pub collection: String,
    pub exists: bool,
}

/// Response for grounded question answering.
#[derive(Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub sources: Vec<SearchResultItem>,
}

/// Response for errors.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Print a value as formatted JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}
