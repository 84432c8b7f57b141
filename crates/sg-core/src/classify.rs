//! Failure classification
//!
//! リモート呼び出しの失敗を閉じたエラー分類に変換します。
//!
//! The remote catalog never sends machine-readable error codes, so the kind of
//! a failure is inferred from its message text. Classification happens once,
//! at the point the raw failure is first observed; a failure that already is a
//! [`ClassifiedError`] is handed back unchanged.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Closed set of failure categories seen by the protocol boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainErrorKind {
    /// Missing, invalid or expired credentials
    Authentication,
    /// The remote call did not finish in time
    Timeout,
    /// Anything else the remote tool reported
    UpstreamApi,
    /// Local failures that never went through the classifier
    Internal,
}

impl DomainErrorKind {
    /// Stable snake_case name, used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainErrorKind::Authentication => "authentication",
            DomainErrorKind::Timeout => "timeout",
            DomainErrorKind::UpstreamApi => "upstream_api",
            DomainErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for DomainErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the keyword table: any keyword present means `kind`
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub kind: DomainErrorKind,
    pub keywords: &'static [&'static str],
}

/// Ordered keyword table. First matching row wins.
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        kind: DomainErrorKind::Authentication,
        keywords: &[
            "unauthorized",
            "401",
            "authentication",
            "invalid token",
            "api key",
            "missing token",
            "expired token",
            "invalid api key",
            "forbidden",
            "403",
        ],
    },
    ClassificationRule {
        kind: DomainErrorKind::Timeout,
        keywords: &["timeout", "timed out", "connection timeout", "read timeout"],
    },
];

/// A failure with its kind decided
///
/// Built once per failing call and never changed afterwards. Cloning shares
/// the underlying cause.
#[derive(Error, Debug, Clone)]
#[error("{detail}")]
pub struct ClassifiedError {
    kind: DomainErrorKind,
    detail: String,
    #[source]
    cause: Option<Arc<dyn StdError + Send + Sync>>,
}

impl ClassifiedError {
    /// Create a classified error without an underlying cause
    pub fn new(kind: DomainErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            cause: None,
        }
    }

    /// Attach the failure this error was derived from
    pub fn with_cause(mut self, cause: anyhow::Error) -> Self {
        let boxed: Box<dyn StdError + Send + Sync> = cause.into();
        self.cause = Some(Arc::from(boxed));
        self
    }

    pub fn authentication(detail: impl Into<String>) -> Self {
        Self::new(DomainErrorKind::Authentication, detail)
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(DomainErrorKind::Timeout, detail)
    }

    pub fn upstream(detail: impl Into<String>) -> Self {
        Self::new(DomainErrorKind::UpstreamApi, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(DomainErrorKind::Internal, detail)
    }

    pub fn kind(&self) -> DomainErrorKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// The original failure, if one was recorded
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

/// Turns opaque failures into [`ClassifiedError`]s using a keyword table
#[derive(Debug, Clone, Copy)]
pub struct ErrorClassifier {
    rules: &'static [ClassificationRule],
}

impl ErrorClassifier {
    /// Classifier backed by [`CLASSIFICATION_RULES`]
    pub fn new() -> Self {
        Self {
            rules: CLASSIFICATION_RULES,
        }
    }

    /// Classifier with a custom rule table
    pub fn with_rules(rules: &'static [ClassificationRule]) -> Self {
        Self { rules }
    }

    /// Decide the kind for a message. Unmatched and empty text is upstream.
    pub fn kind_for(&self, message: &str) -> DomainErrorKind {
        let lower = message.to_lowercase();
        if lower.trim().is_empty() {
            return DomainErrorKind::UpstreamApi;
        }

        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lower.contains(k)))
            .map(|rule| rule.kind)
            .unwrap_or(DomainErrorKind::UpstreamApi)
    }

    /// Classify a failure raised while performing `operation`
    ///
    /// `operation` reads as a gerund phrase, e.g. "searching Statista".
    pub fn classify(&self, operation: &str, failure: anyhow::Error) -> ClassifiedError {
        if let Some(classified) = already_classified(&failure) {
            return classified;
        }

        let message = format!("{:#}", failure);
        let kind = self.kind_for(&message);
        let type_name = failure_type_name(&failure);

        error!(
            operation = operation,
            kind = kind.as_str(),
            failure_type = %type_name,
            error = %message,
            "Remote call failed"
        );

        let detail = match kind {
            DomainErrorKind::Authentication => format!(
                "Authentication failed while {}: {}. Please check your API key is valid and not expired.",
                operation, message
            ),
            DomainErrorKind::Timeout => {
                format!("Request timed out while {}: {}", operation, message)
            }
            DomainErrorKind::UpstreamApi | DomainErrorKind::Internal => {
                format!("Error {}: {}: {}", operation, type_name, message)
            }
        };

        ClassifiedError::new(kind, detail).with_cause(failure)
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Find a classification made by an inner layer anywhere in the chain
fn already_classified(failure: &anyhow::Error) -> Option<ClassifiedError> {
    failure.chain().find_map(|e| {
        e.downcast_ref::<ClassifiedError>()
            .or_else(|| e.downcast_ref::<crate::Error>().and_then(crate::Error::as_domain))
            .cloned()
    })
}

/// Best-effort type label: the leading identifier of the error's Debug form
fn failure_type_name(failure: &anyhow::Error) -> String {
    let outer: &(dyn StdError + Send + Sync + 'static) = failure.as_ref();
    let debug = format!("{:?}", outer);
    let name: String = debug
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if name.is_empty() { "Error".to_string() } else { name }
}
