// Global orb counter endpoint
use crate::models::{CounterRequest, CounterResponse};
use crate::utils::errors::SyncError;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

/// POST `{"version": 2}` to the counter endpoint and return the reported count.
///
/// Every failure is terminal for this call: no retry, no backoff.
pub async fn fetch_or_increment(client: &reqwest::Client, url: &str) -> Result<u64, SyncError> {
    let response = client
        .post(url)
        .header(ACCEPT, "application/json")
        .header(CONTENT_TYPE, "application/json")
        .json(&CounterRequest::current())
        .send()
        .await?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(SyncError::Status(status.as_u16()));
    }

    let body = response.bytes().await?;
    let parsed: CounterResponse =
        serde_json::from_slice(&body).map_err(|e| SyncError::Decode(e.to_string()))?;

    log::debug!("[Counter] Server reported count {}", parsed.count);
    Ok(parsed.count)
}


#[cfg(test)]
mod tests {
    use super::test_server::{always, spawn};
    use super::*;
    use std::time::Duration;

    fn client() -> reqwest::Client {
        crate::utils::http::counter_client(Duration::from_millis(500)).unwrap()
    }

    #[tokio::test]
    async fn success_returns_server_count() {
        let server = spawn(always(200, r#"{"count": 42}"#));
        let count = fetch_or_increment(&client(), &server.url).await.unwrap();
        assert_eq!(count, 42);
    }

    #[tokio::test]
    async fn sends_versioned_json_post() {
        let server = spawn(always(200, r#"{"count": 1}"#));
        fetch_or_increment(&client(), &server.url).await.unwrap();

        let seen = server.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let request = &seen[0];
        assert_eq!(request.method, "POST");
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body, serde_json::json!({ "version": 2 }));
        assert_eq!(request.accept.as_deref(), Some("application/json"));
        assert_eq!(request.content_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn missing_count_reads_as_zero() {
        let server = spawn(always(200, "{}"));
        assert_eq!(fetch_or_increment(&client(), &server.url).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn non_200_is_a_status_error() {
        let server = spawn(always(500, "boom"));
        let err = fetch_or_increment(&client(), &server.url).await.unwrap_err();
        assert!(matches!(err, SyncError::Status(500)));

        // 201 is still not the success contract
        let server = spawn(always(201, r#"{"count": 9}"#));
        let err = fetch_or_increment(&client(), &server.url).await.unwrap_err();
        assert!(matches!(err, SyncError::Status(201)));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = spawn(always(200, "<html>nope</html>"));
        let err = fetch_or_increment(&client(), &server.url).await.unwrap_err();
        assert!(matches!(err, SyncError::Decode(_)));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = spawn(Box::new(|_| (Duration::from_secs(3), 200, r#"{"count": 5}"#.into())));
        let client = crate::utils::http::counter_client(Duration::from_millis(200)).unwrap();
        let err = fetch_or_increment(&client, &server.url).await.unwrap_err();
        assert!(matches!(err, SyncError::Timeout), "got {:?}", err);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        // Bind then drop to get a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = format!("http://127.0.0.1:{}/api/orbcounter", port);
        let err = fetch_or_increment(&client(), &url).await.unwrap_err();
        assert!(matches!(err, SyncError::Transport(_)), "got {:?}", err);
    }
}
