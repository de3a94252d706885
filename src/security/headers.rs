//! Response header policy.
//!
//! # Responsibilities
//! - Hold the ordered table of headers written onto every response
//! - Apply the table to a response header map (overwrite or strip)
//! - Audit a header map against the table
//!
//! # Design Decisions
//! - Built once at startup and shared as `Arc<HeaderPolicy>`; never mutated
//! - An empty value is a strip directive: the header is removed, never sent empty
//! - Names are unique; `HeaderName` is lowercase so duplicates are caught case-insensitively

use std::fmt;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

const HSTS: HeaderValue = HeaderValue::from_static("max-age=31536000; includeSubDomains");
const NO_CACHE: HeaderValue =
    HeaderValue::from_static("no-cache, no-store, max-age=0, must-revalidate");

/// `Cross-Origin-Embedder-Policy`
pub const CROSS_ORIGIN_EMBEDDER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-embedder-policy");
/// `Cross-Origin-Opener-Policy`
pub const CROSS_ORIGIN_OPENER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-opener-policy");
/// `Cross-Origin-Resource-Policy`
pub const CROSS_ORIGIN_RESOURCE_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-resource-policy");

/// Error building a header policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("invalid header name `{0}`")]
    InvalidName(String),

    #[error("invalid value for header `{name}`")]
    InvalidValue { name: HeaderName },

    #[error("header `{0}` is declared more than once")]
    Duplicate(HeaderName),
}

/// What the policy does with one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderRule {
    /// Replace every value the response carries with this one.
    Set(HeaderValue),
    /// Remove the header from the response.
    Strip,
}

/// Ordered, immutable set of response header rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPolicy {
    entries: Vec<(HeaderName, HeaderRule)>,
}

impl HeaderPolicy {
    /// The hardened policy applied by the server.
    pub fn hardened() -> Self {
        let set = |name: HeaderName, value: HeaderValue| (name, HeaderRule::Set(value));

        Self {
            entries: vec![
                set(header::STRICT_TRANSPORT_SECURITY, HSTS),
                set(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
                set(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
                set(header::X_XSS_PROTECTION, HeaderValue::from_static("1")),
                set(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ),
                set(CROSS_ORIGIN_EMBEDDER_POLICY, HeaderValue::from_static("require-corp")),
                set(CROSS_ORIGIN_OPENER_POLICY, HeaderValue::from_static("same-origin")),
                set(CROSS_ORIGIN_RESOURCE_POLICY, HeaderValue::from_static("same-origin")),
                set(header::CACHE_CONTROL, NO_CACHE),
                set(header::PRAGMA, HeaderValue::from_static("no-cache")),
                set(header::EXPIRES, HeaderValue::from_static("0")),
                (header::SERVER, HeaderRule::Strip),
            ],
        }
    }

    /// Start an empty policy.
    pub fn builder() -> HeaderPolicyBuilder {
        HeaderPolicyBuilder::default()
    }

    /// Write the policy onto `headers`.
    ///
    /// `Set` rules replace all existing values for the name; `Strip` rules remove the header.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, rule) in &self.entries {
            match rule {
                HeaderRule::Set(value) => {
                    headers.insert(name.clone(), value.clone());
                }
                HeaderRule::Strip => {
                    headers.remove(name);
                }
            }
        }
    }

    /// Compare `headers` against the policy.
    ///
    /// An empty result means the headers comply. A stripped header that is present
    /// with only empty values is accepted.
    pub fn audit(&self, headers: &HeaderMap) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (name, rule) in &self.entries {
            let actual: Vec<HeaderValue> = headers.get_all(name).iter().cloned().collect();

            match rule {
                HeaderRule::Set(expected) => {
                    if actual.is_empty() {
                        violations.push(Violation::Missing {
                            name: name.clone(),
                            expected: expected.clone(),
                        });
                    } else if actual.len() > 1 || actual[0] != *expected {
                        violations.push(Violation::Mismatch {
                            name: name.clone(),
                            expected: expected.clone(),
                            actual,
                        });
                    }
                }
                HeaderRule::Strip => {
                    if actual.iter().any(|v| !v.is_empty()) {
                        violations.push(Violation::NotStripped {
                            name: name.clone(),
                            actual,
                        });
                    }
                }
            }
        }

        violations
    }

    /// Rule for `name`, if the policy covers it.
    pub fn rule(&self, name: &HeaderName) -> Option<&HeaderRule> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rule)| rule)
    }

    /// Rules in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderRule)> {
        self.entries.iter().map(|(name, rule)| (name, rule))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        Self::hardened()
    }
}

/// Builder for custom policies.
#[derive(Debug, Default)]
pub struct HeaderPolicyBuilder {
    entries: Vec<(HeaderName, HeaderRule)>,
}

impl HeaderPolicyBuilder {
    /// Add a header. An empty `value` records a strip directive.
    pub fn set(mut self, name: &str, value: &str) -> Result<Self, PolicyError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| PolicyError::InvalidName(name.to_string()))?;

        let rule = if value.is_empty() {
            HeaderRule::Strip
        } else {
            let value = HeaderValue::from_str(value)
                .map_err(|_| PolicyError::InvalidValue { name: name.clone() })?;
            HeaderRule::Set(value)
        };

        self.push(name, rule)?;
        Ok(self)
    }

    /// Add a strip directive for `name`.
    pub fn strip(mut self, name: &str) -> Result<Self, PolicyError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| PolicyError::InvalidName(name.to_string()))?;

        self.push(name, HeaderRule::Strip)?;
        Ok(self)
    }

    pub fn build(self) -> HeaderPolicy {
        HeaderPolicy {
            entries: self.entries,
        }
    }

    fn push(&mut self, name: HeaderName, rule: HeaderRule) -> Result<(), PolicyError> {
        if self.entries.iter().any(|(existing, _)| *existing == name) {
            return Err(PolicyError::Duplicate(name));
        }
        self.entries.push((name, rule));
        Ok(())
    }
}

/// A header that does not comply with the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Missing {
        name: HeaderName,
        expected: HeaderValue,
    },
    Mismatch {
        name: HeaderName,
        expected: HeaderValue,
        actual: Vec<HeaderValue>,
    },
    NotStripped {
        name: HeaderName,
        actual: Vec<HeaderValue>,
    },
}

impl Violation {
    pub fn name(&self) -> &HeaderName {
        match self {
            Violation::Missing { name, .. }
            | Violation::Mismatch { name, .. }
            | Violation::NotStripped { name, .. } => name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Violation::Missing { .. } => "missing",
            Violation::Mismatch { .. } => "mismatch",
            Violation::NotStripped { .. } => "not_stripped",
        }
    }

    pub fn expected(&self) -> Option<&HeaderValue> {
        match self {
            Violation::Missing { expected, .. } | Violation::Mismatch { expected, .. } => {
                Some(expected)
            }
            Violation::NotStripped { .. } => None,
        }
    }

    pub fn actual(&self) -> &[HeaderValue] {
        match self {
            Violation::Missing { .. } => &[],
            Violation::Mismatch { actual, .. } | Violation::NotStripped { actual, .. } => actual,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Missing { name, expected } => {
                write!(f, "{name}: missing, expected `{}`", display_value(expected))
            }
            Violation::Mismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "{name}: expected `{}`, got {}",
                display_value(expected),
                display_values(actual)
            ),
            Violation::NotStripped { name, actual } => {
                write!(f, "{name}: must be absent, got {}", display_values(actual))
            }
        }
    }
}

/// Printable form of a header value; non-visible-ASCII values are shown as bytes.
pub fn display_value(value: &HeaderValue) -> String {
    match value.to_str() {
        Ok(s) => s.to_string(),
        Err(_) => format!("{:?}", value.as_bytes()),
    }
}

fn display_values(values: &[HeaderValue]) -> String {
    values
        .iter()
        .map(|v| format!("`{}`", display_value(v)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardened_table() {
        let policy = HeaderPolicy::hardened();
        let mut headers = HeaderMap::new();
        policy.apply(&mut headers);

        let expect = [
            ("strict-transport-security", "max-age=31536000; includeSubDomains"),
            ("x-content-type-options", "nosniff"),
            ("x-frame-options", "DENY"),
            ("x-xss-protection", "1"),
            ("referrer-policy", "strict-origin-when-cross-origin"),
            ("cross-origin-embedder-policy", "require-corp"),
            ("cross-origin-opener-policy", "same-origin"),
            ("cross-origin-resource-policy", "same-origin"),
            ("cache-control", "no-cache, no-store, max-age=0, must-revalidate"),
            ("pragma", "no-cache"),
            ("expires", "0"),
        ];
        for (name, value) in expect {
            assert_eq!(headers.get(name).unwrap(), value, "header {name}");
        }
        assert!(!headers.contains_key(header::SERVER));
        assert_eq!(headers.len(), expect.len());
        assert_eq!(policy.len(), expect.len() + 1);
    }

    #[test]
    fn test_apply_overwrites_and_strips() {
        let policy = HeaderPolicy::hardened();
        let mut headers = HeaderMap::new();
        headers.append(header::CACHE_CONTROL, HeaderValue::from_static("public"));
        headers.append(header::CACHE_CONTROL, HeaderValue::from_static("max-age=600"));
        headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
        headers.insert(header::SERVER, HeaderValue::from_static("nginx/1.25"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        policy.apply(&mut headers);

        let cache: Vec<_> = headers.get_all(header::CACHE_CONTROL).iter().collect();
        assert_eq!(cache, vec!["no-cache, no-store, max-age=0, must-revalidate"]);
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        assert!(headers.get(header::SERVER).is_none());
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/plain");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let policy = HeaderPolicy::hardened();
        let mut once = HeaderMap::new();
        policy.apply(&mut once);
        let mut twice = once.clone();
        policy.apply(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_builder_empty_value_strips() {
        let policy = HeaderPolicy::builder()
            .set("X-Frame-Options", "DENY")
            .unwrap()
            .set("Server", "")
            .unwrap()
            .build();

        assert_eq!(policy.rule(&header::SERVER), Some(&HeaderRule::Strip));
        assert_eq!(
            policy.rule(&header::X_FRAME_OPTIONS),
            Some(&HeaderRule::Set(HeaderValue::from_static("DENY")))
        );
        assert_eq!(policy.rule(&header::PRAGMA), None);
    }

    #[test]
    fn test_builder_preserves_order() {
        let policy = HeaderPolicy::builder()
            .set("pragma", "no-cache")
            .unwrap()
            .strip("server")
            .unwrap()
            .set("expires", "0")
            .unwrap()
            .build();

        let names: Vec<_> = policy.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["pragma", "server", "expires"]);
    }

    #[test]
    fn test_builder_rejects_duplicate_case_insensitive() {
        let err = HeaderPolicy::builder()
            .set("Pragma", "no-cache")
            .unwrap()
            .set("PRAGMA", "no-store")
            .unwrap_err();
        assert!(matches!(err, PolicyError::Duplicate(name) if name == header::PRAGMA));
    }

    #[test]
    fn test_builder_rejects_invalid_input() {
        let err = HeaderPolicy::builder().set("bad header", "x").unwrap_err();
        assert!(matches!(err, PolicyError::InvalidName(_)));

        let err = HeaderPolicy::builder().set("x-test", "line\nbreak").unwrap_err();
        assert!(matches!(err, PolicyError::InvalidValue { .. }));
    }

    #[test]
    fn test_audit_compliant() {
        let policy = HeaderPolicy::hardened();
        let mut headers = HeaderMap::new();
        policy.apply(&mut headers);
        assert!(policy.audit(&headers).is_empty());

        // An empty Server header counts as suppressed.
        headers.insert(header::SERVER, HeaderValue::from_static(""));
        assert!(policy.audit(&headers).is_empty());
    }

    #[test]
    fn test_audit_reports_violations() {
        let policy = HeaderPolicy::hardened();
        let mut headers = HeaderMap::new();
        policy.apply(&mut headers);
        headers.remove(header::PRAGMA);
        headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
        headers.insert(header::SERVER, HeaderValue::from_static("Apache"));

        let violations = policy.audit(&headers);
        assert_eq!(violations.len(), 3);

        let kinds: Vec<_> = violations
            .iter()
            .map(|v| (v.name().as_str(), v.kind()))
            .collect();
        assert!(kinds.contains(&("x-frame-options", "mismatch")));
        assert!(kinds.contains(&("pragma", "missing")));
        assert!(kinds.contains(&("server", "not_stripped")));

        let frame = violations
            .iter()
            .find(|v| *v.name() == header::X_FRAME_OPTIONS)
            .unwrap();
        assert_eq!(
            frame.to_string(),
            "x-frame-options: expected `DENY`, got `SAMEORIGIN`"
        );
    }

    #[test]
    fn test_audit_flags_duplicated_values() {
        let policy = HeaderPolicy::hardened();
        let mut headers = HeaderMap::new();
        policy.apply(&mut headers);
        headers.append(header::EXPIRES, HeaderValue::from_static("0"));

        let violations = policy.audit(&headers);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind(), "mismatch");
        assert_eq!(violations[0].actual().len(), 2);
    }
}
