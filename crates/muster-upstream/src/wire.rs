//! Wire format of the orchestrator metadata source
//!
//! The upstream payloads are arrays of loosely-typed objects. Decoding is
//! strict about required fields (a missing name or state fails the whole
//! fetch) and lenient about the optional ones: absent or null optional
//! fields fall back to zero values rather than failing the parse.

use muster_common::{Container, Host, HostId};
use serde::{Deserialize, Deserializer};

/// Deserialize a service index that might be encoded as a string or null.
/// The metadata source reports numeric fields as strings (e.g. "2") and
/// omits or nulls them for containers outside any service.
fn deserialize_flexible_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;

    struct FlexibleI64Visitor;

    impl de::Visitor<'_> for FlexibleI64Visitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("an i64, a string containing an i64, or null")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
            i64::try_from(value).map_err(|_| de::Error::custom("service index out of range"))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<i64, E> {
            value.parse::<i64>().map_err(de::Error::custom)
        }

        fn visit_none<E: de::Error>(self) -> Result<i64, E> {
            Ok(0)
        }

        fn visit_unit<E: de::Error>(self) -> Result<i64, E> {
            Ok(0)
        }
    }

    deserializer.deserialize_any(FlexibleI64Visitor)
}

/// One container entry as returned by the metadata source
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireContainer {
    name: String,
    state: String,
    primary_ip: String,
    #[serde(default, deserialize_with = "deserialize_flexible_i64")]
    service_index: i64,
    #[serde(default)]
    host_uuid: Option<String>,
}

impl From<WireContainer> for Container {
    fn from(wire: WireContainer) -> Self {
        Self {
            name: wire.name,
            state: wire.state,
            private_ip: wire.primary_ip,
            service_index: wire.service_index,
            host_id: wire.host_uuid.map(HostId::from).unwrap_or_default(),
            host_name: String::new(),
        }
    }
}

/// One host entry as returned by the metadata source
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireHost {
    uuid: String,
    name: String,
}

impl From<WireHost> for Host {
    fn from(wire: WireHost) -> Self {
        Self {
            id: HostId::from(wire.uuid),
            name: wire.name,
        }
    }
}
