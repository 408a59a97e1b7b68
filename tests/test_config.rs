use std::time::Duration;
use timewarp::config::Config;

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.listen_addr, "127.0.0.1:8099");
    assert_eq!(cfg.target_date, "19990412");
    assert_eq!(cfg.server_name, "HttpTimeTravelProxy/0.1");
    assert_eq!(cfg.archive_base, "https://web.archive.org/web");
    assert_eq!(cfg.availability_url, "https://archive.org/wayback/available");
    assert!(cfg.lookup_closest_snapshot);
    assert_eq!(cfg.max_redirects, 10);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_config_empty_yaml_uses_defaults() {
    let cfg = Config::from_yaml_str("").unwrap();
    assert_eq!(cfg.listen_addr, "127.0.0.1:8099");
}

#[test]
fn test_config_partial_yaml() {
    let cfg = Config::from_yaml_str(
        "target_date: \"20010911\"\nlookup_closest_snapshot: false\nmax_redirects: 4\n",
    )
    .unwrap();

    assert_eq!(cfg.target_date, "20010911");
    assert!(!cfg.lookup_closest_snapshot);
    assert_eq!(cfg.max_redirects, 4);
    assert_eq!(cfg.server_name, "HttpTimeTravelProxy/0.1");
}

#[test]
fn test_config_strips_archive_base_slash() {
    let cfg = Config::from_yaml_str("archive_base: \"http://127.0.0.1:9000/web/\"\n").unwrap();
    assert_eq!(cfg.archive_base, "http://127.0.0.1:9000/web");
}

#[test]
fn test_config_rejects_bad_date() {
    for date in ["1999041", "199904120", "1999-04-1", "abcdefgh"] {
        let yaml = format!("target_date: \"{}\"\n", date);
        assert!(Config::from_yaml_str(&yaml).is_err(), "accepted {}", date);
    }
}

#[test]
fn test_config_rejects_zero_redirects() {
    assert!(Config::from_yaml_str("max_redirects: 0\n").is_err());
}

#[test]
fn test_config_rejects_zero_timeouts() {
    for key in ["connect_timeout_secs", "request_timeout_secs", "client_timeout_secs"] {
        let yaml = format!("{}: 0\n", key);
        assert!(Config::from_yaml_str(&yaml).is_err(), "accepted zero {}", key);
    }
}

#[test]
fn test_config_rejects_relative_archive_base() {
    assert!(Config::from_yaml_str("archive_base: \"web.archive.org/web\"\n").is_err());
}

#[test]
fn test_config_rejects_malformed_yaml() {
    assert!(Config::from_yaml_str("max_redirects: [1, 2").is_err());
}

#[test]
fn test_config_timeouts() {
    let cfg = Config::from_yaml_str(
        "connect_timeout_secs: 3\nrequest_timeout_secs: 7\nclient_timeout_secs: 11\n",
    )
    .unwrap();

    assert_eq!(cfg.connect_timeout(), Duration::from_secs(3));
    assert_eq!(cfg.request_timeout(), Duration::from_secs(7));
    assert_eq!(cfg.client_timeout(), Duration::from_secs(11));
}

#[test]
fn test_config_from_file() {
    let path = std::env::temp_dir().join(format!("timewarp-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "listen_addr: \"0.0.0.0:3128\"\nserver_name: \"Retro/1.0\"\n").unwrap();

    let cfg = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(cfg.listen_addr, "0.0.0.0:3128");
    assert_eq!(cfg.server_name, "Retro/1.0");
}

#[test]
fn test_config_missing_file() {
    assert!(Config::from_file("/nonexistent/timewarp.yaml").is_err());
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1.listen_addr, cfg2.listen_addr);
}

#[test]
fn test_config_load_env_overrides() {
    unsafe {
        std::env::set_var("LISTEN", "0.0.0.0:5000");
        std::env::set_var("TIMEWARP_DATE", "20050101");
    }
    let cfg = Config::load(None);
    unsafe {
        std::env::remove_var("LISTEN");
        std::env::remove_var("TIMEWARP_DATE");
    }

    let cfg = cfg.unwrap();
    assert_eq!(cfg.listen_addr, "0.0.0.0:5000");
    assert_eq!(cfg.target_date, "20050101");
}
