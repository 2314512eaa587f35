use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn uploads_limit_defaults_to_10_mib() {
    let settings = Settings::defaults().expect("valid settings");
    assert_eq!(
        settings.uploads.max_request_bytes.get(),
        DEFAULT_UPLOAD_REQUEST_LIMIT_BYTES
    );
}

#[test]
fn uploads_limit_can_be_overridden_via_cli() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        uploads_max_request_bytes: Some(1_572_864),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.uploads.max_request_bytes.get(), 1_572_864);
}

#[test]
fn zero_upload_limit_is_rejected() {
    let mut raw = RawSettings::default();
    raw.uploads.max_request_bytes = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero limit must fail");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "uploads.max_request_bytes",
            ..
        }
    ));
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
fn invalid_log_level_is_reported_with_its_key() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("chatty".to_string());

    let err = Settings::from_raw(raw).expect_err("unknown level must fail");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "logging.level",
            ..
        }
    ));
}

#[test]
fn composer_session_limits_reject_zero() {
    let mut raw = RawSettings::default();
    raw.composer.max_sessions = Some(0);
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = RawSettings::default();
    raw.composer.session_idle_seconds = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn composer_overrides_apply_from_cli() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        composer_max_sessions: Some(8),
        composer_session_idle_seconds: Some(90),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.composer.max_sessions.get(), 8);
    assert_eq!(settings.composer.session_idle, Duration::from_secs(90));
}

#[test]
fn profile_defaults_and_initials() {
    let settings = Settings::defaults().expect("valid settings");
    assert_eq!(settings.profile.display_name, "Alex Rivera");
    assert_eq!(settings.profile.handle, "@arivera.eth");
    assert_eq!(settings.profile.initials, "AR");
    assert!(settings.profile.avatar_url.is_none());
    assert_eq!(settings.navigation.back_href, "/");
}

#[test]
fn initials_are_derived_from_configured_name() {
    let mut raw = RawSettings::default();
    raw.profile.display_name = Some("  mira de la cruz ".to_string());
    raw.profile.avatar_url = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.profile.display_name, "mira de la cruz");
    assert_eq!(settings.profile.initials, "MD");
    assert!(settings.profile.avatar_url.is_none());
}

#[test]
fn back_href_with_whitespace_is_rejected() {
    let mut raw = RawSettings::default();
    raw.navigation.back_href = Some("/creator home".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["patronage"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "patronage",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--server-port",
        "8080",
        "--log-json",
        "true",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(serve.overrides.server_port, Some(8080));
            assert_eq!(serve.overrides.log_json, Some(true));
        }
    }
}
