use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const CERT_CODE_PREFIX: &str = "CERT_E";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeParseError {
    #[error("{0:?} is not a certificate error code")]
    MissingPrefix(String),

    #[error("certificate error code {0:?} must end in three digits")]
    BadSuffix(String),
}

/// A well-formed `CERT_Ennn` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CertErrorCode(u16);

impl CertErrorCode {
    /// Whether `code` belongs to the certificate family. Only the prefix
    /// is checked; malformed suffixes still count.
    pub fn is_cert_code(code: &str) -> bool {
        code.starts_with(CERT_CODE_PREFIX)
    }

    pub fn parse(code: &str) -> Result<Self, CodeParseError> {
        let suffix = code
            .strip_prefix(CERT_CODE_PREFIX)
            .ok_or_else(|| CodeParseError::MissingPrefix(code.to_string()))?;
        if suffix.len() != 3 || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeParseError::BadSuffix(code.to_string()));
        }
        suffix
            .parse()
            .map(Self)
            .map_err(|_| CodeParseError::BadSuffix(code.to_string()))
    }

    pub fn number(self) -> u16 {
        self.0
    }

    pub fn known(self) -> Option<KnownCertError> {
        KnownCertError::from_number(self.0)
    }
}

impl FromStr for CertErrorCode {
    type Err = CodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CertErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", CERT_CODE_PREFIX, self.0)
    }
}

/// Certificate lifecycle failures the panel reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownCertError {
    Port80Occupied,
    Port80External,
    CaTimeout,
    CaRefused,
    DnsResolution,
    CertExpired,
    RenewalFailed,
    CoreReloadFailed,
    FallbackActivated,
    PermissionDenied,
}

impl KnownCertError {
    pub const ALL: [KnownCertError; 10] = [
        KnownCertError::Port80Occupied,
        KnownCertError::Port80External,
        KnownCertError::CaTimeout,
        KnownCertError::CaRefused,
        KnownCertError::DnsResolution,
        KnownCertError::CertExpired,
        KnownCertError::RenewalFailed,
        KnownCertError::CoreReloadFailed,
        KnownCertError::FallbackActivated,
        KnownCertError::PermissionDenied,
    ];

    pub fn from_number(number: u16) -> Option<Self> {
        let index = usize::from(number).checked_sub(1)?;
        Self::ALL.get(index).copied()
    }

    pub fn code(self) -> CertErrorCode {
        CertErrorCode(self as u16 + 1)
    }

    pub fn english(self) -> &'static str {
        match self {
            KnownCertError::Port80Occupied => "Port 80 is occupied by another process",
            KnownCertError::Port80External => {
                "Port 80 is occupied by external process (e.g., Nginx)"
            }
            KnownCertError::CaTimeout => "CA server timeout",
            KnownCertError::CaRefused => "CA server refused the request",
            KnownCertError::DnsResolution => "DNS resolution failed",
            KnownCertError::CertExpired => "Certificate has expired",
            KnownCertError::RenewalFailed => "Certificate renewal failed",
            KnownCertError::CoreReloadFailed => "Xray core reload failed",
            KnownCertError::FallbackActivated => "Fallback mode activated",
            KnownCertError::PermissionDenied => "Permission denied",
        }
    }
}
