//! Integration tests for the DefinitionLoader API

use std::{fs, path::Path, sync::Arc};

use entdef::{
    DefinitionLoader, EntdefError, Format, MemoryFileSystem,
    color::Color,
    config::LoaderConfig,
    diagnostic::{ErrorCode, Severity},
    geometry::Vec3,
};

const QUAKE_FGD: &str = r#"
@BaseClass = Targetname [ targetname(target_source) : "Name" ]
@BaseClass base(Targetname) = Appearflags
[
    spawnflags(flags) =
    [
        256 : "Not in Easy" : 0
        512 : "Not in Normal" : 1
        2048 : "Not in Deathmatch" : 1
    ]
]
@PointClass base(Appearflags) size(32 32 0, -32 -32 256) color(255 128 0) = item_armor : "Armor" []
@SolidClass base(Targetname) = func_door : "Door" []
"#;

#[test]
fn test_load_fgd_from_memory() {
    let loader = DefinitionLoader::default();
    let loaded = loader
        .load_str(QUAKE_FGD, Format::Fgd, None)
        .expect("Failed to load definitions");

    assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);
    assert_eq!(loaded.catalog.len(), 2);
    assert_eq!(loaded.catalog.point_definitions().count(), 1);
    assert_eq!(loaded.catalog.brush_definitions().count(), 1);

    let armor = loaded.catalog.get("item_armor").expect("item_armor");
    assert_eq!(armor.index(), 1);
    assert_eq!(armor.description(), "Armor");
    assert_eq!(armor.color(), Color::from_channels(1.0, 128.0 / 255.0, 0.0));

    let bounds = armor.bounds().expect("point entity");
    assert_eq!(bounds.min(), Vec3::new(-32.0, -32.0, 0.0));
    assert_eq!(bounds.max(), Vec3::new(32.0, 32.0, 256.0));

    let spawnflags = armor.spawnflags().expect("inherited spawnflags");
    assert_eq!(spawnflags.flags_default(), Some(2560));
    assert!(armor.attribute("targetname").is_some());

    let door = loaded.catalog.get("func_door").expect("func_door");
    assert_eq!(door.index(), 2);
    assert!(door.is_brush());
    assert_eq!(door.color(), Color::from_channels(192.0, 192.0, 192.0));
}

#[test]
fn test_configured_default_color() {
    let config = LoaderConfig::default().with_default_color("#ff0000");
    let loaded = DefinitionLoader::new(config)
        .load_str("@SolidClass = func_wall []", Format::Fgd, None)
        .expect("Failed to load definitions");

    let wall = loaded.catalog.get("func_wall").expect("func_wall");
    assert_eq!(wall.color(), Color::from_channels(1.0, 0.0, 0.0));
}

#[test]
fn test_invalid_default_color_is_a_config_error() {
    let config = LoaderConfig::default().with_default_color("sparkly");
    let result = DefinitionLoader::new(config).load_str("", Format::Fgd, None);
    assert!(matches!(result, Err(EntdefError::Config(_))));
}

#[test]
fn test_load_def_and_ent() {
    let loader = DefinitionLoader::default();

    let def = loader
        .load_str(
            "/*QUAKED light (0 1 0) (-8 -8 -8) (8 8 8) START_OFF\nLight.\n*/",
            Format::Def,
            None,
        )
        .expect("Failed to load DEF");
    let light = def.catalog.get("light").expect("light");
    let start_off = light.spawnflags().and_then(|flags| flags.flag(1));
    assert_eq!(
        start_off.map(|flag| flag.short_description()),
        Some("START_OFF")
    );

    let ent = loader
        .load_str(
            r#"<classes><group name="func_wall" color="0 .5 .8">A wall.</group></classes>"#,
            Format::Ent,
            None,
        )
        .expect("Failed to load ENT");
    let wall = ent.catalog.get("func_wall").expect("func_wall");
    assert!(wall.is_brush());
    assert_eq!(wall.description(), "A wall.");
}

#[test]
fn test_empty_documents() {
    let loader = DefinitionLoader::default();
    for format in [Format::Fgd, Format::Def, Format::Ent] {
        let loaded = loader
            .load_str("", format, None)
            .unwrap_or_else(|err| panic!("{format}: {err}"));
        assert!(loaded.catalog.is_empty());
        assert!(loaded.diagnostics.is_empty());
    }
}

#[test]
fn test_warnings_are_returned() {
    let source = r#"
        @PointClass = light [ light(integer) : "Brightness" : "bright" ]
    "#;
    let loaded = DefinitionLoader::default()
        .load_str(source, Format::Fgd, None)
        .expect("warnings do not fail the load");

    assert_eq!(loaded.diagnostics.len(), 1);
    assert_eq!(loaded.diagnostics[0].severity(), Severity::Warning);
    assert_eq!(loaded.diagnostics[0].code(), Some(ErrorCode::E202));
}

#[test]
fn test_deny_warnings() {
    let source = "@PointClass = light []\n@PointClass = light []";
    let config = LoaderConfig::default().with_deny_warnings(true);
    let result = DefinitionLoader::new(config).load_str(source, Format::Fgd, None);

    match result {
        Err(EntdefError::DeniedWarnings { err, .. }) => {
            assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E205));
        }
        other => panic!("expected denied warnings, got {other:?}"),
    }
}

#[test]
fn test_structural_error_keeps_earlier_warnings() {
    let source = "@PointClass = light []\n@PointClass = light []\n@Bogus = nope []";
    let result = DefinitionLoader::default().load_str(source, Format::Fgd, None);

    match result {
        Err(EntdefError::Parse { err, src }) => {
            assert_eq!(src, source);
            assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E102));
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_load_file_with_include_from_disk() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::create_dir(dir.path().join("common")).expect("Failed to create subdirectory");
    fs::write(
        dir.path().join("common/base.fgd"),
        "@BaseClass = Targetname [ targetname(target_source) ]",
    )
    .expect("Failed to write include");
    let root = dir.path().join("game.FGD");
    fs::write(
        &root,
        "@include \"common/base.fgd\"\n@PointClass base(Targetname) = info_target []",
    )
    .expect("Failed to write root");

    let loaded = DefinitionLoader::default()
        .load_file(&root)
        .expect("Failed to load file");

    assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);
    let target = loaded.catalog.get("info_target").expect("info_target");
    assert!(target.attribute("targetname").is_some());
}

#[test]
fn test_missing_file() {
    let result = DefinitionLoader::default().load_file("/definitely/not/here.def");
    assert!(matches!(result, Err(EntdefError::FileSystem(_))));
}

#[test]
fn test_memory_file_system() {
    let file_system = MemoryFileSystem::new()
        .with_file("/game/main.fgd", "@include \"main.fgd\"\n@SolidClass = func_wall []");
    let loaded = DefinitionLoader::default()
        .with_file_system(Arc::new(file_system))
        .load_file(Path::new("/game/main.fgd"))
        .expect("recursive includes are recovered from");

    assert_eq!(loaded.catalog.len(), 1);
    let codes: Vec<_> = loaded
        .diagnostics
        .iter()
        .filter_map(|diagnostic| diagnostic.code())
        .collect();
    assert_eq!(codes, vec![ErrorCode::E300]);
}
