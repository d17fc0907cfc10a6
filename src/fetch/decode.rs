use reqwest::StatusCode;

use crate::error::FetchError;

use super::{AggTrade, FetchResult};

/// Turn a raw aggTrades response into a page of trades.
///
/// Non-2xx responses carry their body into the error. A well-formed empty
/// array is a successful, empty page.
pub fn decode_page(status: StatusCode, body: &str) -> FetchResult<Vec<AggTrade>> {
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    serde_json::from_str(body).map_err(FetchError::Decode)
}
