use std::io::Cursor;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use quartz_nbt::NbtCompound;
use quartz_nbt::io::{Flavor, read_nbt};

use voxschem::color::Color;
use voxschem::testing::VoxBuilder;

#[test]
fn trycmd_tests() {
    let tc = trycmd::TestCases::new();

    tc.insert_var("[VOXSCHEMVERSION]", env!("CARGO_PKG_VERSION"))
        .unwrap();
    tc.case("tests/end-to-end/*.toml");

    tc.run();
}

fn run(args: &[&std::ffi::OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_voxschem"))
        .arg("--no-config-files")
        .arg("--simplify-log-format")
        .args(args)
        .env("VOXSCHEM_DO_NOT_USE_CONFIG_FILES_IN_TESTS", "1")
        .output()
        .unwrap()
}

fn read_schematic(path: &Path) -> NbtCompound {
    let bytes = std::fs::read(path).unwrap();
    read_nbt(&mut Cursor::new(bytes), Flavor::GzCompressed)
        .unwrap()
        .0
}

fn two_color_file() -> Vec<u8> {
    VoxBuilder::new()
        .model([2, 1, 1], &[[0, 0, 0, 1], [0, 1, 0, 2]])
        .palette(&[Color::opaque(255, 0, 0), Color::opaque(0, 255, 0)])
        .build()
}

#[test]
fn convert_with_mapping_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("model.vox");
    let mapping = dir.path().join("mapping.json");
    std::fs::write(&input, two_color_file()).unwrap();
    std::fs::write(
        &mapping,
        r#"[{"color": [255, 0, 0], "numeric_id": "35:14"}]"#,
    )
    .unwrap();

    let output = run(&[
        input.as_os_str(),
        "--mapping".as_ref(),
        mapping.as_os_str(),
        "--default-block=4".as_ref(),
    ]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    // Output name defaults to the input name.
    let nbt = read_schematic(&dir.path().join("model.schematic"));
    assert_eq!(nbt.get::<_, &[i8]>("Blocks").unwrap(), [35i8, 4]);
    assert_eq!(nbt.get::<_, &[i8]>("Data").unwrap(), [14i8, 0]);
}

#[test]
fn convert_all_models() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("pair.vox");
    let out = dir.path().join("out.schematic");
    std::fs::write(
        &input,
        VoxBuilder::new()
            .pack(2)
            .model([1, 1, 1], &[[0, 0, 0, 1]])
            .model([3, 1, 1], &[])
            .build(),
    )
    .unwrap();

    let output = run(&[input.as_os_str(), out.as_os_str(), "--all-models".as_ref()]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        read_schematic(&dir.path().join("out-0.schematic"))
            .get::<_, i16>("Width")
            .unwrap(),
        1
    );
    assert_eq!(
        read_schematic(&dir.path().join("out-1.schematic"))
            .get::<_, i16>("Width")
            .unwrap(),
        3
    );
    assert!(!out.exists());
}

#[test]
fn invalid_vox_reports_cause() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.vox");
    std::fs::write(&input, VoxBuilder::new().version(200).build()).unwrap();

    let output = run(&[input.as_os_str()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("unsupported .vox version 200 (only version 150 is supported)"),
        "{stderr}"
    );
    assert!(!dir.path().join("bad.schematic").exists());
}
