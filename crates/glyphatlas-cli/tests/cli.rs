use std::{fs, path::PathBuf};

use assert_cmd::Command;
use glyphatlas::{
    generate, test_support::MemoryGlyphSource, CharSet, FieldConfig, GlyphBitmap, ShelfPacker,
};
use predicates::prelude::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn glyphatlas() -> Command {
    Command::cargo_bin("glyphatlas").unwrap()
}

#[test]
fn help_lists_subcommands() {
    glyphatlas()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("preview"));
}

#[test]
fn generate_with_missing_font_fails() {
    let dir = scratch_dir("missing_font");
    glyphatlas()
        .args(["generate", "does-not-exist.ttf", "--basedir"])
        .arg(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load font"));
    assert!(!dir.join("fonts").exists());
}

#[test]
fn conflicting_charset_options_are_rejected() {
    glyphatlas()
        .args(["inspect", "x.ftd", "--chars", "65", "--charset-text", "AB"])
        .assert()
        .failure();
}

#[test]
fn inspect_prints_records() {
    let dir = scratch_dir("inspect");
    let charset = CharSet::from_chars("AB").unwrap();
    let font = generate(
        &MemoryGlyphSource::new(),
        &charset,
        16,
        &ShelfPacker::default(),
        &FieldConfig::default(),
    )
    .unwrap();
    let path = dir.join("ab.ftd");
    fs::write(&path, font.description_bytes(&FieldConfig::default()).unwrap()).unwrap();

    let spacing = font.description.line_spacing.unwrap();
    glyphatlas()
        .arg("inspect")
        .arg(&path)
        .args(["--charset-text", "AB"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Records: 2"))
        .stdout(predicate::str::contains(format!("Line spacing: {spacing}")))
        .stdout(predicate::str::contains("32-byte records"))
        .stdout(predicate::str::contains("'A'"))
        .stderr(predicate::str::contains("failed to initialize logging").not());
}

#[test]
fn inspect_with_wrong_layout_fails() {
    let dir = scratch_dir("inspect_wrong_layout");
    let path = dir.join("odd.ftd");
    fs::write(&path, [0u8; 4 + 33]).unwrap();
    glyphatlas()
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to decode"));
}

#[test]
fn preview_draws_text_from_artifacts() {
    let dir = scratch_dir("preview");
    let charset = CharSet::from_chars("A").unwrap();
    let source = MemoryGlyphSource::new().with_glyph(
        'A',
        GlyphBitmap::new(2, 1, vec![200, 100]).unwrap().with_metrics(0, 1, 3),
    );
    let fields = FieldConfig::default();
    let font = generate(&source, &charset, 8, &ShelfPacker::default(), &fields).unwrap();

    let atlas_path = dir.join("a.png");
    let description_path = dir.join("a.ftd");
    image::GrayImage::from_raw(
        font.atlas.width(),
        font.atlas.height(),
        font.atlas.pixels().to_vec(),
    )
    .unwrap()
    .save(&atlas_path)
    .unwrap();
    fs::write(&description_path, font.description_bytes(&fields).unwrap()).unwrap();

    let output = dir.join("out.png");
    glyphatlas()
        .args(["-vv", "preview", "unused.ttf", "--charset-text", "A", "-t", "AA"])
        .args(["--canvas", "10x4", "--margin", "1"])
        .arg("--atlas")
        .arg(&atlas_path)
        .arg("--description")
        .arg(&description_path)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("failed to initialize logging").not());

    let rendered = image::open(&output).unwrap().into_luma8();
    assert_eq!(rendered.dimensions(), (10, 4));
    // pen starts at (1, 1); bearing_y 1 lifts the glyph to row 0
    assert_eq!(rendered.get_pixel(1, 0).0, [200]);
    assert_eq!(rendered.get_pixel(2, 0).0, [100]);
    assert_eq!(rendered.get_pixel(4, 0).0, [200]);
    assert_eq!(rendered.get_pixel(3, 0).0, [0]);
}
