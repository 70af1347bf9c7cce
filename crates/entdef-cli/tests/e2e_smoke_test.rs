//! End-to-end smoke tests running the CLI over the bundled fixtures.

use std::{fs, path::PathBuf};

use entdef_cli::{Args, run};
use entdef::EntdefError;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
}

fn args(input: PathBuf, output: PathBuf) -> Args {
    Args {
        input: input.to_string_lossy().into_owned(),
        output: Some(output.to_string_lossy().into_owned()),
        config: None,
        deny_warnings: true,
        log_level: "off".to_string(),
    }
}

#[test]
fn test_fixtures_load_without_diagnostics() {
    let out_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mut fixtures: Vec<PathBuf> = fs::read_dir(fixtures_dir())
        .expect("Failed to read fixtures directory")
        .map(|entry| entry.expect("Failed to read fixture entry").path())
        .filter(|path| entdef::Format::from_path(path).is_some())
        .collect();
    fixtures.sort();
    assert!(fixtures.len() >= 3, "expected FGD, DEF and ENT fixtures");

    for fixture in fixtures {
        let name = fixture
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = out_dir.path().join(format!("{name}.txt"));

        let summary = run(&args(fixture.clone(), output.clone()))
            .unwrap_or_else(|err| panic!("{name} failed to load: {err}"));

        assert!(summary.diagnostics.is_empty(), "{name}: {:?}", summary.diagnostics);
        assert!(summary.definitions > 0, "{name} has no definitions");

        let report = fs::read_to_string(&output).expect("Failed to read report");
        assert!(report.starts_with('@'), "{name}: unexpected report {report}");
    }
}

#[test]
fn test_fgd_fixture_resolves_includes() {
    let out_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = out_dir.path().join("quake.txt");

    let summary = run(&args(fixtures_dir().join("quake.fgd"), output.clone())).unwrap();
    assert_eq!(summary.definitions, 6);

    let report = fs::read_to_string(&output).unwrap();
    assert!(report.contains("@point 2 item_armor1 \"Green armor\""));
    assert!(report.contains("    target: target_destination \"Target\""));
    assert!(report.contains("        2048 \"Not in Deathmatch\""));
    assert!(report.contains(
        "    model {{ spawnflags & 1 -> \":maps/b_bh10.bsp\", spawnflags & 2 -> \":maps/b_bh100.bsp\", \":maps/b_bh25.bsp\" }}"
    ));
    assert!(report.contains("        2 \"Megahealth\""));
}

#[test]
fn test_malformed_input_fails() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("broken.fgd");
    fs::write(&input, "@PointClass = broken").unwrap();

    let result = run(&args(input, dir.path().join("out.txt")));
    assert!(matches!(result, Err(EntdefError::Parse { .. })));
}

#[test]
fn test_unsupported_extension_fails() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("entities.txt");
    fs::write(&input, "").unwrap();

    let result = run(&args(input, dir.path().join("out.txt")));
    assert!(matches!(result, Err(EntdefError::UnknownFormat(_))));
}
