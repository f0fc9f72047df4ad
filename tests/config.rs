// ABOUTME: Settings tests: env defaults, URL normalization, push host derivation.
// ABOUTME: Uses temp_env so variable changes never leak across tests.

use harbormaster::config::{
    DEFAULT_REGISTRY_URL, MIN_JOB_RETENTION, Settings, normalize_registry_url, resolve_push_host,
};
use std::time::Duration;

const ALL_VARS: [&str; 5] = [
    "REGISTRY_API_URL",
    "REGISTRY_PUSH_HOST",
    "REQUEST_TIMEOUT_SEC",
    "MAX_CATALOG_RESULTS",
    "JOB_RETENTION",
];

fn with_clean_env<F: FnOnce()>(overrides: &[(&str, &str)], f: F) {
    let vars: Vec<(&str, Option<&str>)> = ALL_VARS
        .iter()
        .map(|name| {
            let value = overrides
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| *v);
            (*name, value)
        })
        .collect();
    temp_env::with_vars(vars, f);
}

mod settings_tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        with_clean_env(&[], || {
            let settings = Settings::from_env().unwrap();
            assert_eq!(settings.registry_api_url, DEFAULT_REGISTRY_URL);
            assert_eq!(settings.registry_push_host, "127.0.0.1:5000");
            assert_eq!(settings.request_timeout, Duration::from_secs(20));
            assert_eq!(settings.max_catalog_results, 200);
            assert_eq!(settings.job_retention, 120);
        });
    }

    #[test]
    fn explicit_values_override_defaults() {
        with_clean_env(
            &[
                ("REGISTRY_API_URL", "https://registry.example.com/"),
                ("REGISTRY_PUSH_HOST", "push.example.com:5000"),
                ("REQUEST_TIMEOUT_SEC", "5"),
                ("MAX_CATALOG_RESULTS", "50"),
                ("JOB_RETENTION", "300"),
            ],
            || {
                let settings = Settings::from_env().unwrap();
                assert_eq!(settings.registry_api_url, "https://registry.example.com");
                assert_eq!(settings.registry_push_host, "push.example.com:5000");
                assert_eq!(settings.request_timeout, Duration::from_secs(5));
                assert_eq!(settings.max_catalog_results, 50);
                assert_eq!(settings.job_retention, 300);
            },
        );
    }

    #[test]
    fn job_retention_is_clamped_up_to_the_floor() {
        with_clean_env(&[("JOB_RETENTION", "3")], || {
            let settings = Settings::from_env().unwrap();
            assert_eq!(settings.job_retention, MIN_JOB_RETENTION);
        });
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        with_clean_env(&[("REQUEST_TIMEOUT_SEC", "soon")], || {
            assert!(Settings::from_env().is_err());
        });
        with_clean_env(&[("JOB_RETENTION", "-1")], || {
            assert!(Settings::from_env().is_err());
        });
    }
}

mod url_normalization_tests {
    use super::*;

    #[test]
    fn missing_scheme_gets_http() {
        assert_eq!(
            normalize_registry_url(Some("registry.local:5000".to_string())),
            "http://registry.local:5000"
        );
    }

    #[test]
    fn existing_scheme_and_trailing_slash_are_preserved_and_stripped() {
        assert_eq!(
            normalize_registry_url(Some("https://reg.example.com///".to_string())),
            "https://reg.example.com"
        );
    }

    #[test]
    fn unset_or_blank_falls_back_to_the_default() {
        assert_eq!(normalize_registry_url(None), DEFAULT_REGISTRY_URL);
        assert_eq!(
            normalize_registry_url(Some("   ".to_string())),
            DEFAULT_REGISTRY_URL
        );
    }
}

mod push_host_tests {
    use super::*;

    #[test]
    fn derived_from_the_api_url_authority() {
        assert_eq!(
            resolve_push_host("http://registry.local:5000", None),
            "registry.local:5000"
        );
        assert_eq!(
            resolve_push_host("https://reg.example.com", None),
            "reg.example.com"
        );
    }

    #[test]
    fn explicit_override_wins_and_loses_its_scheme() {
        assert_eq!(
            resolve_push_host("http://internal:5000", Some("http://public.example.com/")),
            "public.example.com"
        );
    }

    #[test]
    fn blank_override_falls_back_to_derivation() {
        assert_eq!(
            resolve_push_host("http://registry.local:5000", Some("  ")),
            "registry.local:5000"
        );
    }
}
