// Snowflake hosts operated by Keboola itself
use serde_json::Value;

pub const KEBOOLA_SNOWFLAKE_HOSTS: &[&str] = &[
    "keboola.eu-central-1.snowflakecomputing.com",
    "keboola.snowflakecomputing.com",
    "keboola.west-europe.azure.snowflakecomputing.com",
    "rl74503-com_keboola_gcp_us_east4.snowflakecomputing.com",
    "rl74503-com_keboola_gcp_europe_west3.snowflakecomputing.com",
    "rl74503-com_keboola_gcp_europe_west3_2.snowflakecomputing.com",
];

/// True when `parameters.db.host` of a configuration body points at a
/// Keboola-provisioned Snowflake account. Exact, case-sensitive match;
/// missing or non-string hosts are not managed.
pub fn is_managed_host(configuration: &Value) -> bool {
    configuration
        .pointer("/parameters/db/host")
        .and_then(Value::as_str)
        .filter(|host| !host.is_empty())
        .is_some_and(|host| KEBOOLA_SNOWFLAKE_HOSTS.contains(&host))
}
