//! `key=value` tag helpers for the metadata edit modals

use std::collections::BTreeMap;

/// Parse `key=value` tags into a map. A tag without `=` maps to an empty
/// value; later duplicates win.
pub fn labels_to_map(labels: &[String]) -> BTreeMap<String, String> {
    labels
        .iter()
        .map(|label| match label.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (label.clone(), String::new()),
        })
        .collect()
}

/// Render a label map back into `key=value` tags.
pub fn map_to_labels(map: &BTreeMap<String, String>) -> Vec<String> {
    map.iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        let tags = vec!["team=alpha".to_string(), "tier=frontend".to_string()];
        let map = labels_to_map(&tags);
        assert_eq!(map.get("team").map(String::as_str), Some("alpha"));
        assert_eq!(map_to_labels(&map), tags);
    }

    #[test]
    fn test_label_without_value() {
        let map = labels_to_map(&["standalone".to_string()]);
        assert_eq!(map.get("standalone").map(String::as_str), Some(""));
    }
}
