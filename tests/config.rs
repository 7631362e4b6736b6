use std::fs;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use gbif_media_fetch::config::{Config, ConfigLoader, RunConfig, default_user_agent};
use gbif_media_fetch::error::GbifError;

#[test]
fn resolve_explicit_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("custom.json");
    fs::write(
        &path,
        r#"{ "output_dir": "/srv/gbif", "timeout_secs": 15, "user_agent": "field-team/1.0" }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.schema_version, 1);
    assert_eq!(resolved.output_dir, Utf8PathBuf::from("/srv/gbif"));
    assert_eq!(resolved.http.timeout_secs, 15);
    assert_eq!(resolved.http.user_agent, "field-team/1.0");
}

#[test]
fn resolve_rejects_bad_json() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("broken.json");
    fs::write(&path, "{ output_dir: ").unwrap();

    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, GbifError::ConfigParse(_));
}

#[test]
fn resolve_rejects_unknown_schema() {
    let config = Config {
        schema_version: Some(2),
        ..Config::default()
    };
    let err = ConfigLoader::resolve_config(config).unwrap_err();
    assert_matches!(err, GbifError::ConfigParse(_));
}

#[test]
fn run_config_takes_resolved_values() {
    let resolved = ConfigLoader::resolve_config(Config::default()).unwrap();
    let run = RunConfig::new(Utf8PathBuf::from("download.zip"), resolved);
    assert_eq!(run.output_root, Utf8PathBuf::from("."));
    assert_eq!(run.http.user_agent, default_user_agent());
    assert!(!run.assume_yes);
}
