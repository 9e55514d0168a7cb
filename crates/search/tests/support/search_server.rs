use base64::{Engine as _, engine::general_purpose};
use mockito::Server;
use sluice_search::{BulkOptions, SearchClient, SearchConfig, get_client_with};

pub const API_ID: &str = "loader";
pub const API_KEY: &str = "s3cret";

#[allow(dead_code)]
pub fn expected_auth_header() -> String {
    format!(
        "ApiKey {}",
        general_purpose::STANDARD.encode(format!("{API_ID}:{API_KEY}"))
    )
}

#[allow(dead_code)]
pub fn client_for(server: &Server) -> SearchClient {
    client_with_bulk(server, BulkOptions::default())
}

#[allow(dead_code)]
pub fn client_with_bulk(server: &Server, bulk: BulkOptions) -> SearchClient {
    let config = SearchConfig::new(server.url())
        .credentials(API_ID, API_KEY)
        .bulk(bulk);
    get_client_with(&config, |_| None).expect("client should build from explicit credentials")
}
