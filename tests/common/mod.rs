use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a Wayback CDX response for one domain: a header row followed by
/// `[urlkey, timestamp, original]` rows built from the given pairs.
pub async fn mount_cdx(server: &MockServer, domain: &str, captures: &[(&str, &str)]) {
    let mut rows = vec![vec![
        "urlkey".to_string(),
        "timestamp".to_string(),
        "original".to_string(),
    ]];
    for (timestamp, url) in captures {
        rows.push(vec!["key".to_string(), timestamp.to_string(), url.to_string()]);
    }

    Mock::given(method("GET"))
        .and(path("/cdx/search/cdx"))
        .and(query_param("url", format!("{domain}/*")))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

/// Mounts a CommonCrawl index response for one domain with the given
/// newline-delimited JSON body.
pub async fn mount_commoncrawl(server: &MockServer, index: &str, domain: &str, ndjson: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/{index}-index")))
        .and(query_param("url", format!("{domain}/*")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ndjson.to_string())
                .insert_header("content-type", "application/x-ndjson"),
        )
        .mount(server)
        .await;
}

/// Mounts a VirusTotal domain report for one domain with the given
/// detected URLs.
pub async fn mount_virustotal(server: &MockServer, domain: &str, urls: &[&str]) {
    let detected: Vec<serde_json::Value> = urls
        .iter()
        .map(|url| serde_json::json!({ "url": url, "positives": 0 }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/vtapi/v2/domain/report"))
        .and(query_param("domain", domain))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "detected_urls": detected })),
        )
        .mount(server)
        .await;
}

/// Mounts a catch-all responder with the given HTTP status code.
pub async fn mount_error(server: &MockServer, status_code: u16) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status_code))
        .mount(server)
        .await;
}

/// Mounts a catch-all responder with a body no source client can parse.
pub async fn mount_garbage(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(server)
        .await;
}
