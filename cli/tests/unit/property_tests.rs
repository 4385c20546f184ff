//! Property-based tests for parsers and validators.

use chrono::{TimeDelta, TimeZone, Utc};
use proptest::prelude::*;

use zcp_cli::domain::config::{VALID_CONFIG_KEYS, validate_config_key};
use zcp_cli::domain::identifiers::{parse_env_pairs, parse_since};
use zcp_cli::domain::mount::validate_mount_hostname;

proptest! {
    /// Only the first `=` separates key from value.
    #[test]
    fn prop_env_pair_splits_on_first_equals(
        key in "[A-Z_][A-Z0-9_]{0,15}",
        value in "[ -~]{0,30}",
    ) {
        let raw = format!("{key}={value}");
        let pairs = parse_env_pairs(&[raw.as_str()]).expect("valid pair");
        prop_assert_eq!(&pairs[0].key, &key);
        prop_assert_eq!(&pairs[0].value, &value);
    }

    /// Input without `=` is always rejected.
    #[test]
    fn prop_env_pair_without_equals_rejected(raw in "[A-Za-z0-9_ ]{0,20}") {
        prop_assert!(parse_env_pairs(&[raw.as_str()]).is_err());
    }

    /// Minutes in range land exactly that far in the past.
    #[test]
    fn prop_since_minutes_in_range(n in 1i64..=1440) {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("valid time");
        let since = parse_since(&format!("{n}m"), now).expect("in range");
        prop_assert_eq!(now - since, TimeDelta::minutes(n));
    }

    /// Days past the 30-day window are rejected.
    #[test]
    fn prop_since_days_out_of_range(n in 31u32..1000) {
        let now = Utc::now();
        let input = format!("{n}d");
        prop_assert!(parse_since(&input, now).is_err());
    }

    /// Arbitrary dotted keys outside the whitelist are rejected.
    #[test]
    fn prop_unknown_config_keys_rejected(key in "[a-z]{1,12}\\.[a-z]{1,12}") {
        prop_assume!(!VALID_CONFIG_KEYS.contains(&key.as_str()));
        prop_assert!(validate_config_key(&key).is_err());
    }

    /// Hostnames with path or shell metacharacters never reach the mounter.
    #[test]
    fn prop_mount_hostname_rejects_metacharacters(
        prefix in "[a-z]{1,8}",
        bad in prop::sample::select(vec!['/', '.', ' ', ';', '$', '`', '\'']),
    ) {
        let hostname = format!("{prefix}{bad}x");
        prop_assert!(validate_mount_hostname(&hostname).is_err());
    }
}

#[test]
fn test_every_config_key_is_accepted() {
    for key in VALID_CONFIG_KEYS {
        assert!(validate_config_key(key).is_ok(), "{key}");
    }
}
