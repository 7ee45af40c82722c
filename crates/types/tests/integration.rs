//! Integration tests for types

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use stowage_types::*;

    #[test]
    fn test_spec_to_logged_package() {
        let spec = PackageSpec::parse("@scope/pkg@^2.0.0").unwrap();
        let logged = LoggedPackage::from(&spec);
        assert_eq!(logged.name.as_deref(), Some("@scope/pkg"));
        assert_eq!(logged.raw_spec, "^2.0.0");

        let json = serde_json::to_value(&logged).unwrap();
        assert_eq!(json["rawSpec"], "^2.0.0");
    }

    #[test]
    fn test_reserved_suffixes_match_store_layout() {
        let id = PackageId::new(format!("pkg/1.0.0{SHASUM_SUFFIX}"));
        assert!(id.is_err());
        let id = PackageId::new(format!("pkg/1.0.0{STAGE_SUFFIX}"));
        assert!(id.is_err());
    }

    proptest! {
        #[test]
        fn valid_ids_stay_under_store(segments in prop::collection::vec("[a-z0-9][a-z0-9.-]{0,8}", 1..4)) {
            let raw = segments.join("/");
            if let Ok(id) = PackageId::new(raw.clone()) {
                let joined = std::path::Path::new("/store").join(id.as_str());
                prop_assert!(joined.starts_with("/store"));
                prop_assert_eq!(id.as_str(), raw.as_str());
            }
        }
    }
}
