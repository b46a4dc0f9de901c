//! Public URL construction for stored objects

/// Join a base URL and an object key with exactly one `/` between them
pub fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}

/// `{endpoint}/{bucket}/{key}`
pub fn raw_object_url(endpoint: &str, bucket: &str, key: &str) -> String {
    join_url(&join_url(endpoint, bucket), key)
}

/// `{cdn}/{key}`
pub fn cdn_object_url(cdn: &str, key: &str) -> String {
    join_url(cdn, key)
}

/// CDN form when a CDN host is configured, raw endpoint form otherwise
pub fn object_url(endpoint: &str, bucket: &str, cdn: Option<&str>, key: &str) -> String {
    match cdn.filter(|c| !c.is_empty()) {
        Some(cdn) => cdn_object_url(cdn, key),
        None => raw_object_url(endpoint, bucket, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_url() {
        assert_eq!(
            raw_object_url("https://s3.example.com", "mybucket", "/svc/products/42/cert.pdf"),
            "https://s3.example.com/mybucket/svc/products/42/cert.pdf"
        );
        assert_eq!(
            raw_object_url("http://localhost:9000/", "b", "a.txt"),
            "http://localhost:9000/b/a.txt"
        );
    }

    #[test]
    fn test_cdn_url() {
        assert_eq!(
            cdn_object_url("https://cdn.example.com/", "/svc/products/42/cert.pdf"),
            "https://cdn.example.com/svc/products/42/cert.pdf"
        );
    }

    #[test]
    fn test_empty_cdn_falls_back_to_endpoint() {
        assert_eq!(
            object_url("https://s3.example.com", "bucket", Some(""), "k"),
            "https://s3.example.com/bucket/k"
        );
        assert_eq!(
            object_url("https://s3.example.com", "bucket", Some("https://cdn.io"), "k"),
            "https://cdn.io/k"
        );
    }
}
