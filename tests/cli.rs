use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use compare_maps::raster::{write_array, RasterHandle, RasterLayout};
use ndarray::Array2;

const WGS84: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],AUTHORITY["EPSG","4326"]]"#;

fn compare_maps() -> Command {
    Command::new(env!("CARGO_BIN_EXE_compare-maps"))
}

fn grid(dir: &Path, name: &str, shape: (usize, usize), origin: (f64, f64)) -> PathBuf {
    let path = dir.join(name);
    let values = Array2::from_shape_fn(shape, |(r, c)| (r * 3 + c) as i16);
    write_array(
        &path,
        &values,
        RasterLayout {
            driver: "GTiff",
            geo_transform: &[origin.0, 1.0, 0.0, origin.1, 0.0, -1.0],
            projection: WGS84,
        },
    )
    .unwrap();
    path
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_invalid_boundarymap_is_rejected_before_io() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let output = compare_maps()
        .arg(dir.path().join("a.tif"))
        .arg(dir.path().join("b.tif"))
        .arg(&out)
        .arg("--boundarymap=3")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("can only be 1 or 2"), "{}", stderr(&output));
    assert!(!out.exists());
}

#[test]
fn test_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let a = grid(dir.path(), "a.tif", (3, 3), (0.0, 3.0));
    let out = dir.path().join("out");
    let output = compare_maps()
        .arg(&a)
        .arg(dir.path().join("missing.tif"))
        .arg(&out)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("does not exist"), "{}", stderr(&output));
    assert!(!out.exists());
}

#[test]
fn test_invalid_flag_usage() {
    let output = compare_maps().arg("only-one-path").output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Usage"), "{}", stderr(&output));
}

#[test]
fn test_failing_clip_program_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let a = grid(dir.path(), "a.tif", (3, 3), (0.0, 3.0));
    let b = grid(dir.path(), "b.tif", (5, 5), (-1.0, 4.0));
    let output = compare_maps()
        .arg(&a)
        .arg(&b)
        .arg(dir.path().join("out"))
        .arg("--clip-program=compare-maps-missing-clipper")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains("compare-maps-missing-clipper"),
        "{}",
        stderr(&output)
    );
}

#[test]
fn test_window_clipper_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let a = grid(dir.path(), "a.tif", (4, 5), (0.0, 4.0));
    let b = grid(dir.path(), "b.tif", (6, 7), (-1.0, 5.0));
    let out = dir.path().join("out");

    let output = compare_maps()
        .arg(&a)
        .arg(&b)
        .arg(&out)
        .args(["--clipper", "window", "--boundarymap=1", "--map2_scale=-1"])
        .args(["--meta", "nightly check", "--log-level", "debug"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    let clipped = out.join("b_clippedto_a.tif");
    let difference = out.join("a_minus_b_clippedto_a.tif");
    assert!(clipped.exists());
    assert!(out.join("a_vs_b_clippedto_a_scatter.png").exists());

    let band = RasterHandle::open(&difference).unwrap().read_band(1).unwrap();
    assert_eq!(band.shape(), (4, 5));
    // b is offset by one row and one column: b[r+1][c+1] = a[r][c] + 4.
    for ((r, c), v) in band.values().indexed_iter() {
        let a_value = (r * 3 + c) as f64;
        assert_eq!(*v, a_value + (a_value + 4.0));
    }

    let meta = std::fs::read_to_string(out.join("a_minus_b_clippedto_a_meta.txt")).unwrap();
    assert!(meta.contains("Notes: nightly check"));
    assert!(meta.contains("a.tif"));
    assert!(meta.contains("b.tif"));
}
