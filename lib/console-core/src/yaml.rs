//! Manifest text mode for the dual-mode editor
//!
//! The raw-text side of the editor works on YAML. A parse failure is a
//! blocking error for the caller; the in-memory form keeps its last-good
//! state because nothing here mutates it.

use console_api::v1::HTTPProxy;

use crate::error::Result;

pub fn parse_manifest(input: &str) -> Result<HTTPProxy> {
    Ok(serde_yaml::from_str(input)?)
}

pub fn manifest_to_yaml(proxy: &HTTPProxy) -> Result<String> {
    Ok(serde_yaml::to_string(proxy)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    const MANIFEST: &str = r#"
apiVersion: projectcontour.io/v1
kind: HTTPProxy
metadata:
  name: app1
  namespace: team-a
spec:
  ingressClassName: public
  virtualhost:
    fqdn: app1.example.com
  routes:
    - conditions:
        - prefix: /
      services:
        - name: svc1
          port: 8080
"#;

    #[test]
    fn test_parse_and_serialize() {
        let proxy = parse_manifest(MANIFEST).expect("Failed to parse manifest");
        assert_eq!(proxy.metadata.name.as_deref(), Some("app1"));

        let yaml = manifest_to_yaml(&proxy).expect("Failed to serialize manifest");
        assert!(yaml.contains("apiVersion: projectcontour.io/v1"));
        assert!(yaml.contains("kind: HTTPProxy"));
        assert!(yaml.contains("fqdn: app1.example.com"));
    }

    #[test]
    fn test_malformed_text_is_a_blocking_error() {
        let err = parse_manifest("{not yaml: [").expect_err("expected parse error");
        assert!(matches!(err, CoreError::InvalidManifest(_)));
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let proxy = parse_manifest(MANIFEST).expect("Failed to parse manifest");
        let first = manifest_to_yaml(&proxy).expect("Failed to serialize manifest");
        let second = manifest_to_yaml(&proxy).expect("Failed to serialize manifest");
        assert_eq!(first, second);
    }
}
