use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use tailor_packer_core::prelude::*;
use tailor_packer_core::TailorError;
use tempfile::TempDir;

fn write_sprite(path: &Path, w: u32, h: u32, color: [u8; 4]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbaImage::from_pixel(w, h, Rgba(color)).save(path).unwrap();
}

fn layout() -> (TempDir, PathBuf, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("sprites");
    let sheets = tmp.path().join("sheets");
    let manifest = tmp.path().join("tailors.json");
    fs::create_dir_all(&root).unwrap();
    (tmp, root, sheets, manifest)
}

fn no_opt() -> PackerConfig {
    PackerConfig::builder().optimizer(OptimizerKind::None).build()
}

#[test]
fn three_squares_match_reference_layout() {
    let (_tmp, root, sheets, manifest) = layout();
    for name in ["a", "b", "c"] {
        write_sprite(&root.join("hats").join(format!("{}.png", name)), 32, 32, [1, 2, 3, 255]);
    }
    let cfg = PackerConfig::builder()
        .max_width(64)
        .optimizer(OptimizerKind::None)
        .build();

    let tailors = run(&root, &sheets, &manifest, &cfg, &NoopOptimizer).expect("run");
    assert_eq!(tailors.len(), 1);
    let pos: Vec<(&str, u32, u32)> = tailors[0]
        .dressings
        .iter()
        .map(|d| (d.name.as_str(), d.x, d.y))
        .collect();
    assert_eq!(pos, vec![("a", 0, 0), ("b", 32, 0), ("c", 0, 32)]);
    assert_eq!(
        image::image_dimensions(sheets.join("hats.png")).unwrap(),
        (64, 64)
    );
}

#[test]
fn defaults_fill_in_around_name_only_override() {
    let (_tmp, root, sheets, manifest) = layout();
    write_sprite(&root.join("hair_long").join("braid.png"), 4, 4, [9, 9, 9, 255]);
    fs::write(root.join("hair_long").join("tailor.json"), r#"{"name": "Long hair"}"#).unwrap();

    let tailors = run(&root, &sheets, &manifest, &no_opt(), &NoopOptimizer).unwrap();
    let t = &tailors[0];
    assert_eq!(t.name, "Long hair");
    assert!(t.allow_clear);
    assert_eq!(t.spritesheet, "hair_long");
    assert_eq!(t.z_index, 100);
    assert!(sheets.join("hair_long.png").is_file());
}

#[test]
fn full_override_and_extra_keys_reach_the_manifest() {
    let (_tmp, root, sheets, manifest) = layout();
    write_sprite(&root.join("eyes").join("blue.png"), 2, 2, [0, 0, 255, 255]);
    fs::write(
        root.join("eyes").join("tailor.json"),
        r#"{"name": "Eyes", "allow_clear": false, "spritesheet": "face", "z-index": 250, "palette": "cool"}"#,
    )
    .unwrap();

    run(&root, &sheets, &manifest, &no_opt(), &NoopOptimizer).unwrap();
    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&manifest).unwrap()).unwrap();
    let entry = &raw[0];
    assert_eq!(entry["name"], "Eyes");
    assert_eq!(entry["allow_clear"], false);
    assert_eq!(entry["spritesheet"], "face");
    assert_eq!(entry["z-index"], 250);
    assert_eq!(entry["palette"], "cool");
    assert_eq!(entry["dressings"][0]["name"], "blue");
    assert!(sheets.join("face.png").is_file());
    assert!(!sheets.join("eyes.png").exists());
}

#[test]
fn manifest_counts_follow_folders_and_pngs() {
    let (_tmp, root, sheets, manifest) = layout();
    write_sprite(&root.join("b_shirts").join("red.png"), 3, 5, [255, 0, 0, 255]);
    write_sprite(&root.join("b_shirts").join("green.png"), 3, 5, [0, 255, 0, 255]);
    write_sprite(&root.join("a_shoes").join("left.PNG"), 2, 2, [1, 1, 1, 255]);
    write_sprite(&root.join("a_shoes").join(".preview.png"), 2, 2, [1, 1, 1, 255]);
    fs::write(root.join("a_shoes").join("notes.txt"), "not a sprite").unwrap();
    fs::write(root.join("README.txt"), "root files are not tailors").unwrap();
    fs::create_dir_all(root.join("c_empty")).unwrap();

    let tailors = run(&root, &sheets, &manifest, &no_opt(), &NoopOptimizer).unwrap();
    let names: Vec<&str> = tailors.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a_shoes", "b_shirts", "c_empty"]);
    assert_eq!(tailors[0].dressings.len(), 1);
    assert_eq!(tailors[0].dressings[0].name, "left");
    let shirts: Vec<&str> = tailors[1].dressings.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(shirts, vec!["green", "red"]);

    let reread = read_manifest(&manifest).unwrap();
    assert_eq!(reread, tailors);
}

#[test]
fn empty_folder_yields_empty_dressings_and_single_pixel_sheet() {
    let (_tmp, root, sheets, manifest) = layout();
    fs::create_dir_all(root.join("nothing")).unwrap();

    let tailors = run(&root, &sheets, &manifest, &no_opt(), &NoopOptimizer).unwrap();
    assert!(tailors[0].dressings.is_empty());
    let sheet = image::open(sheets.join("nothing.png")).unwrap().to_rgba8();
    assert_eq!(sheet.dimensions(), (1, 1));
    assert_eq!(sheet.get_pixel(0, 0)[3], 0);
}

#[test]
fn empty_root_still_writes_an_empty_manifest() {
    let (_tmp, root, sheets, manifest) = layout();
    let tailors = run(&root, &sheets, &manifest, &no_opt(), &NoopOptimizer).unwrap();
    assert!(tailors.is_empty());
    assert_eq!(fs::read_to_string(&manifest).unwrap(), "[]");
}

#[test]
fn sheet_and_coordinates_reproduce_every_sprite() {
    let (_tmp, root, sheets, manifest) = layout();
    let dir = root.join("mixed");
    fs::create_dir_all(&dir).unwrap();
    let sizes = [(7, 3), (12, 9), (5, 5), (20, 2), (1, 14), (9, 9)];
    for (i, (w, h)) in sizes.iter().enumerate() {
        let img = RgbaImage::from_fn(*w, *h, |x, y| {
            Rgba([(i * 40) as u8, (x * 13) as u8, (y * 17) as u8, 128 + (x + y) as u8])
        });
        img.save(dir.join(format!("s{}.png", i))).unwrap();
    }
    let cfg = PackerConfig::builder()
        .max_width(24)
        .optimizer(OptimizerKind::None)
        .build();

    let tailors = run(&root, &sheets, &manifest, &cfg, &NoopOptimizer).unwrap();
    let sheet = image::open(sheets.join("mixed.png")).unwrap().to_rgba8();
    assert!(sheet.width() <= 24);
    for d in &tailors[0].dressings {
        let original = image::open(dir.join(format!("{}.png", d.name))).unwrap().to_rgba8();
        let cut = tailor_packer_core::compositing::extract_rgba(&sheet, &d.rect())
            .expect("inside sheet");
        assert_eq!(cut, original, "pixels differ for {}", d.name);
    }
}

#[test]
fn sprite_wider_than_max_width_aborts() {
    let (_tmp, root, sheets, manifest) = layout();
    write_sprite(&root.join("banners").join("wide.png"), 40, 2, [0, 0, 0, 255]);
    let cfg = PackerConfig::builder()
        .max_width(32)
        .optimizer(OptimizerKind::None)
        .build();

    let err = run(&root, &sheets, &manifest, &cfg, &NoopOptimizer).unwrap_err();
    assert!(matches!(err, TailorError::SpriteTooWide { width: 40, max_width: 32, .. }));
    assert!(!manifest.exists());
}

#[test]
fn malformed_tailor_file_aborts() {
    let (_tmp, root, sheets, manifest) = layout();
    write_sprite(&root.join("broken").join("x.png"), 2, 2, [0, 0, 0, 255]);
    fs::write(root.join("broken").join("tailor.json"), "{ \"name\": ").unwrap();

    let err = run(&root, &sheets, &manifest, &no_opt(), &NoopOptimizer).unwrap_err();
    assert!(matches!(err, TailorError::InvalidTailorFile { .. }));
}

#[test]
fn null_tailor_file_means_defaults_but_arrays_are_rejected() {
    let (_tmp, root, sheets, manifest) = layout();
    fs::create_dir_all(root.join("plain")).unwrap();
    fs::write(root.join("plain").join("tailor.json"), "null").unwrap();
    let tailors = run(&root, &sheets, &manifest, &no_opt(), &NoopOptimizer).unwrap();
    assert_eq!(tailors[0].name, "plain");

    fs::write(root.join("plain").join("tailor.json"), "[1, 2]").unwrap();
    let err = run(&root, &sheets, &manifest, &no_opt(), &NoopOptimizer).unwrap_err();
    match err {
        TailorError::InvalidTailorFile { reason, .. } => assert!(reason.contains("array")),
        other => panic!("expected InvalidTailorFile, got {:?}", other),
    }
}

#[test]
fn missing_root_is_an_io_error() {
    let (tmp, _root, sheets, manifest) = layout();
    let absent = tmp.path().join("absent");
    let err = run(&absent, &sheets, &manifest, &no_opt(), &NoopOptimizer).unwrap_err();
    assert!(matches!(err, TailorError::Io(_)));
}

#[test]
fn spritesheet_must_stay_inside_sheet_dir() {
    for bad in ["../escaped", "nested/sheet", "", ".."] {
        let (tmp, root, sheets, manifest) = layout();
        write_sprite(&root.join("hats").join("cap.png"), 2, 2, [0, 0, 0, 255]);
        let body = serde_json::json!({ "spritesheet": bad }).to_string();
        fs::write(root.join("hats").join("tailor.json"), body).unwrap();

        let err = run(&root, &sheets, &manifest, &no_opt(), &NoopOptimizer).unwrap_err();
        match err {
            TailorError::InvalidTailorFile { path, .. } => {
                assert!(path.ends_with("hats/tailor.json"), "{:?}", path);
            }
            other => panic!("expected InvalidTailorFile for {:?}, got {:?}", bad, other),
        }
        assert!(!tmp.path().join("escaped.png").exists());
        assert!(!manifest.exists());
    }
}
