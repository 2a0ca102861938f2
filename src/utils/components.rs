// Snowflake writer component kinds and the regions they live in
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Writer on AWS stacks.
    AwsSnowflake,
    /// Writer on the Azure stack.
    AzureSnowflake,
    /// Writer on GCP stacks, BigQuery default backend.
    GcpSnowflake,
    /// Writer on GCP stacks, Snowflake default backend.
    GcpS3Snowflake,
}

pub const ALL_COMPONENT_KINDS: &[ComponentKind] = &[
    ComponentKind::AwsSnowflake,
    ComponentKind::AzureSnowflake,
    ComponentKind::GcpSnowflake,
    ComponentKind::GcpS3Snowflake,
];

impl ComponentKind {
    pub fn id(self) -> &'static str {
        match self {
            ComponentKind::AwsSnowflake => "keboola.wr-db-snowflake",
            ComponentKind::AzureSnowflake => "keboola.wr-snowflake-blob-storage",
            ComponentKind::GcpSnowflake => "keboola.wr-db-snowflake-gcs",
            ComponentKind::GcpS3Snowflake => "keboola.wr-db-snowflake-gcs-s3",
        }
    }

    pub fn is_gcp(self) -> bool {
        matches!(self, ComponentKind::GcpSnowflake | ComponentKind::GcpS3Snowflake)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ComponentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_COMPONENT_KINDS
            .iter()
            .copied()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| AppError::Config(format!("Unknown writer component id \"{}\"", s)))
    }
}

/// Source stack URL -> writer kinds present on that stack.
/// Stacks not listed here are AWS stacks.
pub const REGION_COMPONENTS: &[(&str, &[ComponentKind])] = &[
    (
        "https://connection.north-europe.azure.keboola.com",
        &[ComponentKind::AzureSnowflake],
    ),
    (
        "https://connection.europe-west3.gcp.keboola.com",
        &[ComponentKind::GcpSnowflake, ComponentKind::GcpS3Snowflake],
    ),
    (
        "https://connection.us-east4.gcp.keboola.com",
        &[ComponentKind::GcpSnowflake, ComponentKind::GcpS3Snowflake],
    ),
];

const DEFAULT_REGION_COMPONENTS: &[ComponentKind] = &[ComponentKind::AwsSnowflake];

/// Looks up the writer kinds to migrate for a source stack URL.
pub fn source_components_for(source_url: &str) -> &'static [ComponentKind] {
    let normalized = source_url.trim_end_matches('/');
    REGION_COMPONENTS
        .iter()
        .find(|(url, _)| *url == normalized)
        .map(|(_, kinds)| *kinds)
        .unwrap_or(DEFAULT_REGION_COMPONENTS)
}

/// Picks the destination writer kind.
///
/// GCP writers come in two flavours; the right one depends on the
/// destination project's default backend, whatever the override says.
pub fn resolve_destination_kind(
    source_kind: ComponentKind,
    override_kind: Option<ComponentKind>,
    destination_default_backend: Option<&str>,
) -> ComponentKind {
    let kind = override_kind.unwrap_or(source_kind);
    if kind.is_gcp() {
        if destination_default_backend == Some("snowflake") {
            ComponentKind::GcpS3Snowflake
        } else {
            ComponentKind::GcpSnowflake
        }
    } else {
        kind
    }
}
