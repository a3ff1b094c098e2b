//! JSON decoding shared by the remote collaborators.

use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::core::errors::AssistError;

/// Decodes a JSON body, turning non-2xx statuses and malformed payloads into
/// upstream errors.
pub(crate) async fn read_json<T: DeserializeOwned>(
    res: Response,
    service: &str,
) -> Result<T, AssistError> {
    let status = res.status();
    if !status.is_success() {
        let text = res.text().await.unwrap_or_default();
        return Err(AssistError::upstream(format!(
            "{service} service returned {status}: {text}"
        )));
    }

    res.json::<T>()
        .await
        .map_err(|err| AssistError::upstream(format!("{service} response was malformed: {err}")))
}
