//! Access rules.
//!
//! Every request is permitted. Public paths are listed explicitly so the
//! matched rule shows up in logs, and so a future restriction on the
//! trailing any-request rule leaves them open.

use std::fmt;

/// Paths marked public by default.
pub const DEFAULT_PUBLIC_PATHS: [&str; 2] = ["/actuator/health", "/actuator/prometheus"];

/// Rule that produced an access decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchedRule {
    /// The path is in the public path list.
    PublicPath(String),
    /// Catch-all rule.
    AnyRequest,
}

impl fmt::Display for MatchedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchedRule::PublicPath(path) => write!(f, "public-path({path})"),
            MatchedRule::AnyRequest => f.write_str("any-request"),
        }
    }
}

/// Outcome of evaluating the access rules for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Permit(MatchedRule),
}

impl AccessDecision {
    pub fn is_permitted(&self) -> bool {
        matches!(self, AccessDecision::Permit(_))
    }

    pub fn rule(&self) -> &MatchedRule {
        match self {
            AccessDecision::Permit(rule) => rule,
        }
    }
}

/// Ordered access rules: public paths first, then any request.
///
/// No CSRF token validation is performed for any method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    public_paths: Vec<String>,
}

impl AccessPolicy {
    pub fn new<I, P>(public_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            public_paths: public_paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Evaluate the rules for a request path. Always permits.
    pub fn authorize(&self, path: &str) -> AccessDecision {
        let rule = self
            .public_paths
            .iter()
            .find(|public| public.as_str() == path)
            .map(|public| MatchedRule::PublicPath(public.clone()))
            .unwrap_or(MatchedRule::AnyRequest);

        AccessDecision::Permit(rule)
    }

    pub fn public_paths(&self) -> &[String] {
        &self.public_paths
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_PATHS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths_match_exactly() {
        let policy = AccessPolicy::default();

        assert_eq!(
            policy.authorize("/actuator/health"),
            AccessDecision::Permit(MatchedRule::PublicPath("/actuator/health".into()))
        );
        assert_eq!(
            policy.authorize("/actuator/prometheus").rule(),
            &MatchedRule::PublicPath("/actuator/prometheus".into())
        );
        assert_eq!(
            policy.authorize("/actuator/health/liveness").rule(),
            &MatchedRule::AnyRequest
        );
    }

    #[test]
    fn test_everything_is_permitted() {
        let policy = AccessPolicy::new(Vec::<String>::new());
        for path in ["/", "/admin", "/actuator/health", "/../etc/passwd", ""] {
            let decision = policy.authorize(path);
            assert!(decision.is_permitted(), "{path} should be permitted");
            assert_eq!(decision.rule(), &MatchedRule::AnyRequest);
        }
    }

    #[test]
    fn test_rule_display() {
        assert_eq!(
            MatchedRule::PublicPath("/actuator/health".into()).to_string(),
            "public-path(/actuator/health)"
        );
        assert_eq!(MatchedRule::AnyRequest.to_string(), "any-request");
    }
}
