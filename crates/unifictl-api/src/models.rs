// Controller record types
//
// Most operations hand back `data` verbatim as JSON values. These typed
// views cover the records the client itself needs to look inside (site
// lookup for device scans). Fields use `#[serde(default)]` liberally because
// the controller is inconsistent about field presence across versions.

use serde::{Deserialize, Serialize};

/// Site object from `/api/self/sites`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRecord {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    /// Short site id used in `/api/s/{site}/...` paths.
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Device object from `stat/device`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub mac: String,
    #[serde(rename = "type", default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
    /// 0=offline, 1=online, 2=pending, 4=upgrading, 5=provisioning
    #[serde(default)]
    pub state: Option<i32>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn device_keeps_unknown_fields() {
        let device: DeviceRecord = serde_json::from_value(json!({
            "_id": "abc123",
            "mac": "f0:9f:c2:33:94:27",
            "type": "uap",
            "num_sta": 12
        }))
        .unwrap();
        assert_eq!(device.device_type.as_deref(), Some("uap"));
        assert_eq!(device.extra.get("num_sta"), Some(&json!(12)));
    }

    #[test]
    fn site_requires_name() {
        assert!(serde_json::from_value::<SiteRecord>(json!({"_id": "x"})).is_err());
        let site: SiteRecord =
            serde_json::from_value(json!({"_id": "x", "name": "default", "desc": "Default"})).unwrap();
        assert_eq!(site.name, "default");
    }
}
