//! Prerendered page artifact.

use crate::lambda::Lambda;

/// Freshness policy for a prerendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// The page never goes stale; it is regenerated only on redeploy.
    Never,
    /// The page is considered stale after this many seconds.
    After(u64),
}

/// A precomputed page plus the function that regenerates it.
///
/// The page body itself is declared through `fallback`: the deploy path of
/// a static output that serves while a regeneration is in flight. Whether
/// that path actually exists in the surrounding output mapping is enforced
/// by the orchestrator, not by this artifact.
#[derive(Debug, Clone)]
pub struct Prerender {
    /// Freshness policy.
    pub expiration: Expiration,

    /// Function invoked to regenerate the page.
    pub lambda: Lambda,

    /// Deploy path of the static page body served until regeneration.
    pub fallback: Option<String>,

    /// Pages sharing a group id are regenerated together.
    pub group: Option<u32>,

    /// Secret that lets a request bypass the prerendered copy.
    pub bypass_token: Option<String>,
}

impl Prerender {
    pub fn new(expiration: Expiration, lambda: Lambda) -> Self {
        Self {
            expiration,
            lambda,
            fallback: None,
            group: None,
            bypass_token: None,
        }
    }

    pub fn fallback(mut self, deploy_path: impl Into<String>) -> Self {
        self.fallback = Some(deploy_path.into());
        self
    }

    pub fn group(mut self, group: u32) -> Self {
        self.group = Some(group);
        self
    }

    pub fn bypass_token(mut self, token: impl Into<String>) -> Self {
        self.bypass_token = Some(token.into());
        self
    }
}
