use serde::{Deserialize, Serialize};

/// Where a step draws its input funds from.
///
/// ABI-encoded as `uint8` in farm calls. `Internal` is the protocol-held
/// (non-circulating) balance; `External` is the caller's wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FromMode {
    External,
    Internal,
    /// Drain the internal balance first, then fall back to external.
    InternalExternal,
    /// Use whatever the internal balance holds, even if short.
    InternalTolerant,
}

impl FromMode {
    pub fn as_u8(self) -> u8 {
        match self {
            FromMode::External => 0,
            FromMode::Internal => 1,
            FromMode::InternalExternal => 2,
            FromMode::InternalTolerant => 3,
        }
    }
}

/// Where a step delivers its output funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToMode {
    External,
    Internal,
}

impl ToMode {
    pub fn as_u8(self) -> u8 {
        match self {
            ToMode::External => 0,
            ToMode::Internal => 1,
        }
    }
}

impl std::fmt::Display for FromMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FromMode::External => "external",
            FromMode::Internal => "internal",
            FromMode::InternalExternal => "internal_external",
            FromMode::InternalTolerant => "internal_tolerant",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for ToMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ToMode::External => "external",
            ToMode::Internal => "internal",
        };
        write!(f, "{s}")
    }
}
