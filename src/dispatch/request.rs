//! Outbound request value.

use reqwest::Method;

/// An immutable description of one outbound call.
///
/// The dispatcher does not interpret the body or headers; it hands them to the
/// transport as-is. Headers are never copied into diagnostic events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    method: Method,
    target: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl OutboundRequest {
    /// Creates a request with no headers and an empty body.
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        OutboundRequest {
            method,
            target: target.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Shorthand for a `POST` request.
    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    /// Adds a header. Repeated names are sent repeatedly.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replaces the body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Absolute URL of the call.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of a header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Encoded body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let request = OutboundRequest::post("https://example.com/create")
            .with_header("Content-Type", "application/json")
            .with_header("Signature", "c2ln")
            .with_body(b"{}".to_vec());

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.target(), "https://example.com/create");
        assert_eq!(request.headers().len(), 2);
        assert_eq!(request.header("signature"), Some("c2ln"));
        assert_eq!(request.header("Accept"), None);
        assert_eq!(request.body(), b"{}");
    }
}
