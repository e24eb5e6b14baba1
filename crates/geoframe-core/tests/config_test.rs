use geoframe_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use geoframe_core::{MatchPolicy, ValidityMode};
use serial_test::serial;
use std::env;
use std::io::Write;

const VARS: &[&str] = &[
    "GEOFRAME_LEFT_SUFFIX",
    "GEOFRAME_RIGHT_SUFFIX",
    "GEOFRAME_MATCH_POLICY",
    "GEOFRAME_SNAP_TOLERANCE",
    "GEOFRAME_SPATIAL_INDEX",
    "GEOFRAME_GEOMETRY_VALIDITY",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_env_overrides_defaults() {
    clear_env();
    env::set_var("GEOFRAME_MATCH_POLICY", "first");
    env::set_var("GEOFRAME_SNAP_TOLERANCE", "0.25");
    env::set_var("GEOFRAME_SPATIAL_INDEX", "false");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.match_policy.value, MatchPolicy::First);
    assert_eq!(config.match_policy.source, ConfigSource::Environment);
    assert_eq!(config.snap_tolerance.value, 0.25);
    assert!(!config.spatial_index.value);
    assert_eq!(config.left_suffix.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_values_are_ignored() {
    clear_env();
    env::set_var("GEOFRAME_MATCH_POLICY", "nearest");
    env::set_var("GEOFRAME_SNAP_TOLERANCE", "-3");
    env::set_var("GEOFRAME_GEOMETRY_VALIDITY", "sloppy");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.match_policy.value, MatchPolicy::All);
    assert_eq!(config.match_policy.source, ConfigSource::Default);
    assert_eq!(config.snap_tolerance.value, 0.0);
    assert_eq!(config.geometry_validity.value, ValidityMode::Lenient);

    clear_env();
}

#[test]
#[serial]
fn test_full_precedence_chain() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "left_suffix = \"_file\"\nright_suffix = \"_file\"\ngeometry_validity = \"strict\"")
        .unwrap();
    env::set_var("GEOFRAME_RIGHT_SUFFIX", "_env");
    env::set_var("GEOFRAME_GEOMETRY_VALIDITY", "lenient");

    let mut config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();
    config.update_from_cli(CliConfigOverrides {
        geometry_validity: Some(ValidityMode::Strict),
        ..Default::default()
    });

    assert_eq!(config.left_suffix.value, "_file");
    assert_eq!(config.left_suffix.source, ConfigSource::File);
    assert_eq!(config.right_suffix.value, "_env");
    assert_eq!(config.right_suffix.source, ConfigSource::Environment);
    assert_eq!(config.geometry_validity.value, ValidityMode::Strict);
    assert_eq!(config.geometry_validity.source, ConfigSource::Cli);

    let options = config.to_ops_options();
    assert_eq!(options.suffixes.left, "_file");
    assert_eq!(options.suffixes.right, "_env");

    clear_env();
}
