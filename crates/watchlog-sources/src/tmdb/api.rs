use reqwest::{Client, Request};
use serde::Deserialize;
use tracing::debug;
use crate::error::LookupError;
use crate::traits::MovieMatch;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub total_results: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Year part of a `YYYY-MM-DD` release date. Missing or empty dates give 0.
pub fn parse_release_year(release_date: Option<&str>) -> Result<i32, LookupError> {
    let date = match release_date.map(str::trim) {
        None | Some("") => return Ok(0),
        Some(date) => date,
    };

    let year = date.split('-').next().unwrap_or_default();
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(LookupError::InvalidReleaseDate(date.to_string()));
    }
    year.parse()
        .map_err(|_| LookupError::InvalidReleaseDate(date.to_string()))
}

/// Only the first result is used; TMDB orders by relevance.
pub fn first_match(response: SearchResponse) -> Result<Option<MovieMatch>, LookupError> {
    let Some(first) = response.results.into_iter().next() else {
        return Ok(None);
    };

    let release_year = parse_release_year(first.release_date.as_deref())?;
    Ok(Some(MovieMatch {
        tmdb_id: first.id,
        release_year,
        title: first.title,
    }))
}

/// GET `{base_url}/search/movie?api_key=..&query=..&language=..`
pub fn search_request(
    client: &Client,
    base_url: &str,
    api_key: &str,
    title: &str,
    language: &str,
) -> Result<Request, LookupError> {
    let url = format!("{}/search/movie", base_url.trim_end_matches('/'));
    let request = client
        .get(&url)
        .query(&[("api_key", api_key), ("query", title), ("language", language)])
        .header("Accept", "application/json")
        .build()?;
    Ok(request)
}

/// Non-2xx responses become `LookupError::Status` with the body kept for the log.
pub async fn search_movie(client: &Client, request: Request, title: &str) -> Result<SearchResponse, LookupError> {
    let response = client.execute(request).await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LookupError::Status {
            provider: "tmdb",
            status: status.as_u16(),
            body,
        });
    }

    let body = response.text().await?;
    let parsed: SearchResponse = serde_json::from_str(&body)?;
    debug!(
        "TMDB search '{}': {} result(s)",
        title,
        parsed.total_results.unwrap_or(parsed.results.len() as u64)
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers one request with a canned response and hands back the request line.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/3", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&request).lines().next().unwrap_or_default().to_string()
        });

        (base_url, handle)
    }

    fn local_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn test_search_request_shape() {
        let client = Client::new();
        let request = search_request(&client, "https://api.themoviedb.org/3/", "secret", "Mr. & Mrs. Smith", "fi-FI").unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().host_str(), Some("api.themoviedb.org"));
        assert_eq!(request.url().path(), "/3/search/movie");
        assert_eq!(request.headers()["accept"], "application/json");

        let params: HashMap<String, String> = request.url().query_pairs().into_owned().collect();
        assert_eq!(params.len(), 3);
        assert_eq!(params["api_key"], "secret");
        assert_eq!(params["query"], "Mr. & Mrs. Smith");
        assert_eq!(params["language"], "fi-FI");
    }

    #[tokio::test]
    async fn test_search_movie_success() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"page": 1, "results": [{"id": 807, "title": "Se7en", "release_date": "1995-09-22"}], "total_results": 1}"#,
        )
        .await;
        let client = local_client();

        let request = search_request(&client, &base_url, "key", "Seven", "fi-FI").unwrap();
        let response = search_movie(&client, request, "Seven").await.unwrap();
        let found = first_match(response).unwrap().unwrap();
        assert_eq!(found.tmdb_id, 807);
        assert_eq!(found.release_year, 1995);

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /3/search/movie?"), "{}", request_line);
        assert!(request_line.contains("api_key=key"));
        assert!(request_line.contains("query=Seven"));
        assert!(request_line.contains("language=fi-FI"));
    }

    #[tokio::test]
    async fn test_search_movie_unauthorized() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 401 Unauthorized",
            r#"{"status_code": 7, "status_message": "Invalid API key: You must be granted a valid key."}"#,
        )
        .await;
        let client = local_client();

        let request = search_request(&client, &base_url, "wrong", "Seven", "fi-FI").unwrap();
        let err = search_movie(&client, request, "Seven").await.unwrap_err();
        match err {
            LookupError::Status { provider, status, body } => {
                assert_eq!(provider, "tmdb");
                assert_eq!(status, 401);
                assert!(body.contains("Invalid API key"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_search_movie_bad_json() {
        let (base_url, server) = serve_once("HTTP/1.1 200 OK", "<html>maintenance</html>").await;
        let client = local_client();

        let request = search_request(&client, &base_url, "key", "Seven", "fi-FI").unwrap();
        let err = search_movie(&client, request, "Seven").await.unwrap_err();
        assert!(matches!(err, LookupError::Decode(_)));
        server.await.unwrap();
    }

    #[test]
    fn test_parse_release_year() {
        assert_eq!(parse_release_year(Some("1995-09-22")).unwrap(), 1995);
        assert_eq!(parse_release_year(Some("2021")).unwrap(), 2021);
        assert_eq!(parse_release_year(Some("")).unwrap(), 0);
        assert_eq!(parse_release_year(None).unwrap(), 0);
    }

    #[test]
    fn test_parse_release_year_rejects_garbage() {
        assert!(parse_release_year(Some("unknown")).is_err());
        assert!(parse_release_year(Some("95-09-22")).is_err());
    }

    #[test]
    fn test_first_match_takes_first_result() {
        let body = r#"{
            "page": 1,
            "results": [
                {"id": 284054, "title": "Black Panther", "release_date": "2018-02-13"},
                {"id": 505642, "title": "Black Panther: Wakanda Forever", "release_date": "2022-11-09"}
            ],
            "total_results": 2
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let found = first_match(response).unwrap().unwrap();
        assert_eq!(found.tmdb_id, 284054);
        assert_eq!(found.release_year, 2018);
        assert_eq!(found.title.as_deref(), Some("Black Panther"));
    }

    #[test]
    fn test_first_match_without_release_date() {
        let body = r#"{"results": [{"id": 42, "title": "Unreleased", "release_date": ""}]}"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let found = first_match(response).unwrap().unwrap();
        assert_eq!(found.tmdb_id, 42);
        assert_eq!(found.release_year, 0);

        let body = r#"{"results": [{"id": 43}]}"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_match(response).unwrap().unwrap().release_year, 0);
    }

    #[test]
    fn test_first_match_empty_results() {
        let response: SearchResponse = serde_json::from_str(r#"{"page": 1, "results": []}"#).unwrap();
        assert!(first_match(response).unwrap().is_none());

        // error payloads carry no results array
        let response: SearchResponse =
            serde_json::from_str(r#"{"status_code": 7, "status_message": "Invalid API key"}"#).unwrap();
        assert!(first_match(response).unwrap().is_none());
    }
}
