//! # URN Grammar — Parsing, Generation, Formatting
//!
//! The canonical identifier form is
//!
//! ```text
//! urn:<namespaceId>:<jurisdiction>:<category>:<recordType>:<localReference>:<uuid>[:<version>]
//! ```
//!
//! where `localReference` is percent-encoded with the unreserved set plus
//! `-_.~!*'();:@&=+$,/`. Parsing and generation are pure over an explicit
//! [`UrnPolicy`] and [`CatalogSnapshot`]: the same inputs always produce
//! the same outcome, and a concurrent catalog reload cannot be observed
//! mid-operation.
//!
//! ## Round-Trip Invariant
//!
//! `generate` re-parses the string it assembled before returning, so every
//! minted URN parses back to byte-identical components (after
//! percent-decoding `localReference`).

use std::sync::LazyLock;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::CatalogSnapshot;
use crate::error::UrnError;

/// Anchored URN grammar. Character classes mirror the canonical scheme:
/// the local reference matches its percent-encoded form, the UUID its
/// 36-character canonical form.
static URN_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^urn:(?P<nid>[a-z0-9-]{1,32}):(?P<jurisdiction>[a-z]{2,3}):(?P<category>[a-z0-9-]+):(?P<record_type>[a-z0-9-]+):(?P<local>[A-Za-z0-9%\-._~!*'();:@&=+$,/]+):(?P<uuid>[0-9a-fA-F-]{36})(?::(?P<version>v[0-9A-Za-z.-]+))?$",
    )
    .expect("invalid URN grammar regex")
});

static DEFAULT_JURISDICTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,3}$").expect("invalid jurisdiction pattern"));

/// Bytes that must be percent-encoded in a local reference: everything
/// outside the unreserved set plus `-_.~!*'();:@&=+$,/`.
const LOCAL_REFERENCE_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'!')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'/');

/// Instance-level identifier policy: the namespace this authority issues
/// under and an optional secondary pattern for jurisdiction codes.
#[derive(Debug, Clone)]
pub struct UrnPolicy {
    /// Expected namespace id. `None` accepts any namespace.
    pub namespace_id: Option<String>,
    /// Secondary jurisdiction pattern, checked after the grammar match.
    /// `None` accepts any grammar-valid jurisdiction.
    pub jurisdiction_pattern: Option<Regex>,
}

impl UrnPolicy {
    /// A policy that accepts any namespace and jurisdiction.
    pub fn unrestricted() -> Self {
        Self {
            namespace_id: None,
            jurisdiction_pattern: None,
        }
    }

    fn effective_namespace(&self) -> String {
        self.namespace_id
            .as_deref()
            .map(|n| n.trim().to_ascii_lowercase())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "de".to_string())
    }
}

impl Default for UrnPolicy {
    fn default() -> Self {
        Self {
            namespace_id: Some("de".to_string()),
            jurisdiction_pattern: Some(DEFAULT_JURISDICTION_PATTERN.clone()),
        }
    }
}

/// The structured components of a parsed URN. The local reference is
/// stored percent-decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrnComponents {
    pub namespace_id: String,
    pub jurisdiction: String,
    pub category: String,
    pub record_type: String,
    pub local_reference: String,
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Inputs for minting a new identifier.
///
/// Jurisdiction, category, and record type are normalized to lowercase;
/// the local reference is taken verbatim and percent-encoded. A supplied
/// UUID is validated and normalized to canonical hyphenated form; `None`
/// mints a fresh random v4.
#[derive(Debug, Clone, Copy)]
pub struct MintRequest<'a> {
    pub jurisdiction: &'a str,
    pub category: &'a str,
    pub record_type: &'a str,
    pub local_reference: &'a str,
    pub uuid: Option<&'a str>,
    pub version: Option<&'a str>,
}

/// Structured validity check result, for callers that want a report
/// instead of an error to branch on.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<UrnComponents>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A validated URN: the canonical string plus its parsed components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Urn {
    raw: String,
    components: UrnComponents,
}

impl Urn {
    /// Parse a raw identifier against the grammar, the instance policy,
    /// and one catalog snapshot.
    ///
    /// # Errors
    ///
    /// [`UrnError::MalformedIdentifier`] on a grammar mismatch,
    /// [`UrnError::UnexpectedNamespace`] / [`UrnError::JurisdictionPatternMismatch`]
    /// on policy rejection, and [`UrnError::CategoryNotAllowed`] /
    /// [`UrnError::RecordTypeNotAllowed`] on catalog rejection.
    pub fn parse(raw: &str, policy: &UrnPolicy, catalog: &CatalogSnapshot) -> Result<Self, UrnError> {
        let captures = URN_GRAMMAR
            .captures(raw)
            .ok_or_else(|| UrnError::MalformedIdentifier {
                raw: raw.to_string(),
            })?;

        let namespace_id = &captures["nid"];
        if let Some(expected) = policy.namespace_id.as_deref() {
            let expected = expected.trim().to_ascii_lowercase();
            if namespace_id != expected.as_str() {
                return Err(UrnError::UnexpectedNamespace {
                    found: namespace_id.to_string(),
                    expected,
                });
            }
        }

        let jurisdiction = &captures["jurisdiction"];
        if let Some(pattern) = &policy.jurisdiction_pattern {
            if !pattern.is_match(jurisdiction) {
                return Err(UrnError::JurisdictionPatternMismatch {
                    jurisdiction: jurisdiction.to_string(),
                    pattern: pattern.as_str().to_string(),
                });
            }
        }

        let category = &captures["category"];
        let record_type = &captures["record_type"];
        let effective = catalog.effective(jurisdiction);
        if !effective.allows_category(category) {
            return Err(UrnError::CategoryNotAllowed {
                category: category.to_string(),
                jurisdiction: jurisdiction.to_string(),
            });
        }
        if !effective.allows_record_type(record_type) {
            return Err(UrnError::RecordTypeNotAllowed {
                record_type: record_type.to_string(),
                jurisdiction: jurisdiction.to_string(),
            });
        }

        let local_reference = percent_decode_str(&captures["local"])
            .decode_utf8()
            .map_err(|_| UrnError::MalformedIdentifier {
                raw: raw.to_string(),
            })?
            .into_owned();

        Ok(Self {
            raw: raw.to_string(),
            components: UrnComponents {
                namespace_id: namespace_id.to_string(),
                jurisdiction: jurisdiction.to_string(),
                category: category.to_string(),
                record_type: record_type.to_string(),
                local_reference,
                uuid: captures["uuid"].to_string(),
                version: captures.name("version").map(|v| v.as_str().to_string()),
            },
        })
    }

    /// Mint a new identifier under the instance policy and one catalog
    /// snapshot.
    ///
    /// The assembled string is re-parsed before being returned, so a
    /// successful mint is guaranteed to round-trip.
    ///
    /// # Errors
    ///
    /// [`UrnError::InvalidUuid`] for a non-canonical supplied UUID, the
    /// catalog rejections from [`Urn::parse`], and
    /// [`UrnError::MalformedIdentifier`] when an input (empty local
    /// reference, bad version token) produces a string outside the
    /// grammar.
    pub fn generate(
        request: &MintRequest<'_>,
        policy: &UrnPolicy,
        catalog: &CatalogSnapshot,
    ) -> Result<Self, UrnError> {
        let jurisdiction = request.jurisdiction.trim().to_ascii_lowercase();
        let category = request.category.trim().to_ascii_lowercase();
        let record_type = request.record_type.trim().to_ascii_lowercase();

        // Check the catalog up front so the caller gets the policy error,
        // not the MalformedIdentifier from the self-check parse.
        let effective = catalog.effective(&jurisdiction);
        if !effective.allows_category(&category) {
            return Err(UrnError::CategoryNotAllowed {
                category,
                jurisdiction,
            });
        }
        if !effective.allows_record_type(&record_type) {
            return Err(UrnError::RecordTypeNotAllowed {
                record_type,
                jurisdiction,
            });
        }

        let uuid = match request.uuid {
            Some(value) => Uuid::parse_str(value.trim())
                .map_err(|_| UrnError::InvalidUuid {
                    value: value.to_string(),
                })?
                .hyphenated()
                .to_string(),
            None => Uuid::new_v4().hyphenated().to_string(),
        };

        let local = utf8_percent_encode(request.local_reference, LOCAL_REFERENCE_ESCAPE);
        let mut raw = format!(
            "urn:{}:{}:{}:{}:{}:{}",
            policy.effective_namespace(),
            jurisdiction,
            category,
            record_type,
            local,
            uuid
        );
        if let Some(version) = request.version {
            raw.push(':');
            raw.push_str(version);
        }

        // Self-check: the round-trip invariant holds by construction.
        Self::parse(&raw, policy, catalog)
    }

    /// Non-panicking structured validity check.
    pub fn validate(raw: &str, policy: &UrnPolicy, catalog: &CatalogSnapshot) -> ValidationReport {
        match Self::parse(raw, policy, catalog) {
            Ok(urn) => ValidationReport {
                valid: true,
                components: Some(urn.components),
                reason: None,
            },
            Err(e) => ValidationReport {
                valid: false,
                components: None,
                reason: Some(e.to_string()),
            },
        }
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed components.
    pub fn components(&self) -> &UrnComponents {
        &self.components
    }

    /// Consume the URN, returning the canonical string.
    pub fn into_string(self) -> String {
        self.raw
    }
}

impl std::fmt::Display for Urn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
