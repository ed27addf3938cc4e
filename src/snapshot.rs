//! Read-only aggregate of the engine state, built on demand.
use serde::{Deserialize, Serialize};

/// Opaque DHT routing table statistics, echoed back without interpretation.
pub type DhtStats = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalMetrics {
    /// Blended global download rate, in bytes per second.
    pub download_rate: f64,
    /// Blended global upload rate, in bytes per second.
    pub upload_rate: f64,
    /// Sum over all torrents.
    pub bytes_downloaded: u64,
    /// Sum over all torrents.
    pub bytes_uploaded: u64,
    pub connected_peers: u64,
    pub active_peers: u64,
}

/// Queue depths reported by the disk layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub disk_queue_depth: u64,
    pub hash_queue_depth: u64,
}

/// ```json
/// {
///   "global": { "download_rate": 0.0, "upload_rate": 0.0, "bytes_downloaded": 0, ... },
///   "system": { "disk_queue_depth": 0, "hash_queue_depth": 0 },
///   "dht": {},
///   "torrents": 0,
///   "peers": 0
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub global: GlobalMetrics,
    pub system: SystemMetrics,
    pub dht: DhtStats,
    /// Number of torrent records.
    pub torrents: usize,
    /// Number of peer records.
    pub peers: usize,
}

impl MetricsSnapshot {
    /// Indented JSON.
    ///
    /// # Errors
    ///
    /// Will return an error if a DHT statistic cannot be serialized.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn it_should_be_exported_as_indented_json_with_the_top_level_sections() {
        let mut dht = DhtStats::new();
        dht.insert("nodes".to_owned(), json!(128));

        let snapshot = MetricsSnapshot {
            global: GlobalMetrics {
                download_rate: 1.5,
                bytes_downloaded: 10,
                ..Default::default()
            },
            system: SystemMetrics {
                disk_queue_depth: 3,
                hash_queue_depth: 1,
            },
            dht,
            torrents: 2,
            peers: 5,
        };

        let text = snapshot.to_json_pretty().unwrap();

        assert!(text.contains("\n  \"global\": {"));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            json!({
                "global": {
                    "download_rate": 1.5,
                    "upload_rate": 0.0,
                    "bytes_downloaded": 10,
                    "bytes_uploaded": 0,
                    "connected_peers": 0,
                    "active_peers": 0
                },
                "system": { "disk_queue_depth": 3, "hash_queue_depth": 1 },
                "dht": { "nodes": 128 },
                "torrents": 2,
                "peers": 5
            })
        );
    }

    #[test]
    fn it_should_keep_the_top_level_key_order() {
        let text = MetricsSnapshot::default().to_json_pretty().unwrap();

        let positions: Vec<usize> = ["\"global\"", "\"system\"", "\"dht\"", "\"torrents\"", "\"peers\""]
            .iter()
            .map(|key| text.find(key).unwrap())
            .collect();

        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
