//! Fallback port

use domain::ResultSample;
#[cfg(test)]
use mockall::automock;

/// Port producing degraded synthetic responses
#[cfg_attr(test, automock)]
pub trait FallbackPort: Send + Sync {
    /// Serve one fallback response
    ///
    /// The returned sample is always successful and tagged as a fallback.
    /// Implementations count the fallback and the degraded request.
    fn respond(&self) -> ResultSample;
}
