use super::*;

#[test]
fn defaults_match_cache_and_listing_contract() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert_eq!(settings.cache.point_capacity.get(), 56);
    assert_eq!(settings.cache.query_capacity.get(), 128);
    assert_eq!(settings.cache.scan_ttl, Duration::from_secs(600));
    assert_eq!(settings.cache.key_query_ttl, Duration::from_secs(6000));
    assert_eq!(settings.listing.preview_size.get(), 3);
    assert_eq!(settings.listing.filtered_preview_size.get(), 5);
    assert_eq!(settings.listing.truncate_words.get(), 85);
    assert!(settings.database.url.is_none());
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.cache.scan_ttl_seconds = Some(30);

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        cache_scan_ttl_seconds: Some(90),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.cache.scan_ttl, Duration::from_secs(90));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_cache_capacity_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.point_capacity = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero capacity");

    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.point_capacity",
            ..
        }
    ));
}

#[test]
fn zero_ttl_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.key_query_ttl_seconds = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero ttl");

    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.key_query_ttl_seconds",
            ..
        }
    ));
}

#[test]
fn blank_database_url_means_in_memory() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(settings.database.url.is_none());
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("chatty".to_string());

    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "logging.level",
            ..
        })
    ));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["postcache"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "postcache",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--cache-point-capacity",
        "10",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.database.database_url.as_deref(),
                Some("postgres://override")
            );
            assert_eq!(serve.overrides.cache_point_capacity, Some(10));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_migrate_arguments() {
    let args = CliArgs::parse_from([
        "postcache",
        "migrate",
        "--database-url",
        "postgres://example",
    ]);

    match args.command.expect("migrate command") {
        Command::Migrate(migrate) => {
            assert_eq!(
                migrate.database.database_url.as_deref(),
                Some("postgres://example")
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn migrate_database_override_applies() {
    let mut raw = RawSettings::default();
    raw.apply_database_override(&DatabaseOverride {
        database_url: Some("postgres://cli".to_string()),
    });

    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.database.url.as_deref(), Some("postgres://cli"));
}
