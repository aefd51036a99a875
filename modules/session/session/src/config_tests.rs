#![cfg_attr(coverage_nightly, coverage(off))]

use std::time::Duration;

use crate::config::SessionConfig;

#[test]
fn defaults_match_design_values() {
    let cfg = SessionConfig::default();
    let validator = cfg.validator_config();
    assert_eq!(validator.check_interval, Duration::from_secs(1800));
    assert_eq!(validator.freshness_window, Duration::from_secs(86_400));
    assert_eq!(cfg.profile_path, "/auth/me");
}

#[test]
fn yaml_overrides_single_field() {
    let cfg: SessionConfig = serde_saphyr::from_str("check_interval_seconds: 60\n").unwrap();
    assert_eq!(cfg.check_interval_seconds, 60);
    assert_eq!(cfg.freshness_window_seconds, 86_400);
}

#[test]
fn unknown_fields_are_rejected() {
    let res: Result<SessionConfig, _> = serde_saphyr::from_str("interval: 5\n");
    assert!(res.is_err());
}
