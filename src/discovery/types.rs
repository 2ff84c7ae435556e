//! EIP-6963 announcement types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::provider::Eip1193Provider;

/// Metadata a wallet announces about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Unique per announcement session (UUIDv4 for real wallets).
    pub uuid: String,
    /// Human-readable wallet name.
    pub name: String,
    /// Icon as a data URI or URL.
    pub icon: String,
    /// Reverse-DNS identifier, e.g. `io.metamask`.
    #[serde(default)]
    pub rdns: String,
}

/// One announced provider: metadata plus the callable handle.
#[derive(Clone)]
pub struct ProviderDetail {
    pub info: ProviderInfo,
    pub provider: Arc<dyn Eip1193Provider>,
}

impl ProviderDetail {
    pub fn new(info: ProviderInfo, provider: Arc<dyn Eip1193Provider>) -> Self {
        Self { info, provider }
    }

    pub fn uuid(&self) -> &str {
        &self.info.uuid
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Whether `needle` names this provider by uuid, rdns or display name.
    ///
    /// Names compare case-insensitively.
    pub fn matches(&self, needle: &str) -> bool {
        self.info.uuid == needle
            || (!self.info.rdns.is_empty() && self.info.rdns == needle)
            || self.info.name.eq_ignore_ascii_case(needle)
    }
}

impl std::fmt::Debug for ProviderDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDetail")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}
