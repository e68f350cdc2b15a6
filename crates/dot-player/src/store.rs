//! The backing store songs are deleted from.
//!
//! Deletion is two-phase: [`SongStore::delete_song`] starts a request and
//! returns immediately, the outcome shows up later in
//! [`SongStore::drain_finished`], which the controller polls every frame.

use serde::Deserialize;

use crate::error::DeleteError;

/// Completed delete request.
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteOutcome {
    pub song_id: String,
    pub result: Result<(), DeleteError>,
}

pub trait SongStore {
    fn delete_song(&mut self, song_id: &str);
    fn drain_finished(&mut self) -> Vec<DeleteOutcome>;
}

#[derive(Deserialize)]
struct DeleteResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// `{server}{endpoint}/{song_id}`; `server` is empty for same-origin requests.
pub fn delete_url(server: &str, endpoint: &str, song_id: &str) -> String {
    format!(
        "{}/{}/{}",
        server.trim_end_matches('/'),
        endpoint.trim_matches('/'),
        song_id
    )
}

/// Interprets the `{success, error?}` body returned by the delete endpoint.
///
/// # Errors
///
/// [`DeleteError::Rejected`] when the server refused, [`DeleteError::BadResponse`]
/// when the body is not the expected JSON.
pub fn parse_delete_response(body: &str) -> Result<(), DeleteError> {
    let response: DeleteResponse =
        serde_json::from_str(body).map_err(|e| DeleteError::BadResponse(e.to_string()))?;
    if response.success {
        Ok(())
    } else {
        Err(DeleteError::Rejected(
            response.error.unwrap_or_else(|| "the server refused to delete the song".to_string()),
        ))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_is_ok() {
        assert_eq!(parse_delete_response(r#"{"success": true}"#), Ok(()));
    }

    #[test]
    fn failure_body_carries_server_message() {
        assert_eq!(
            parse_delete_response(r#"{"success": false, "error": "Song not found"}"#),
            Err(DeleteError::Rejected("Song not found".to_string()))
        );
        assert!(matches!(
            parse_delete_response(r#"{"success": false}"#),
            Err(DeleteError::Rejected(_))
        ));
    }

    #[test]
    fn non_json_body_is_bad_response() {
        assert!(matches!(
            parse_delete_response("<html>500</html>"),
            Err(DeleteError::BadResponse(_))
        ));
    }

    #[test]
    fn url_joins_server_endpoint_and_id() {
        assert_eq!(delete_url("", "/delete_song", "12"), "/delete_song/12");
        assert_eq!(
            delete_url("http://127.0.0.1:5000/", "delete_song/", "7"),
            "http://127.0.0.1:5000/delete_song/7"
        );
    }
}
