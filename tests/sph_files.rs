use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use rts_sph::{CoefficientModel, Component, ModelConfig, SphError, DEFAULT_KNOTS};
use tempfile::TempDir;

/// Degree-1 model over the default knots: per knot "0.5" then "0.1 0.2 0.3".
fn degree_one_sph() -> String {
    let mut text = format!("1 11 21 {}\n", "1".repeat(21));
    for _ in 0..DEFAULT_KNOTS.len() {
        text.push_str("0.5\n0.1 0.2 0.3\n");
    }
    text
}

fn write_sph(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).expect("write sph fixture");
    path
}

#[test]
fn default_knots_degree_one_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_sph(&dir, "model.sph", &degree_one_sph());

    let model = CoefficientModel::from_config(&ModelConfig {
        filename: Some(path),
        degree: Some(1),
        ..ModelConfig::default()
    })
    .unwrap();

    assert_eq!(model.shape(), [21, 2, 2, 2]);
    for k in 0..21 {
        assert_eq!(model.coefficient(k, Component::Real, 0, 0), Some(0.5));
        assert_eq!(model.coefficient(k, Component::Real, 1, 0), Some(0.1));
        assert_eq!(model.coefficient(k, Component::Real, 1, 1), Some(0.2));
        assert_eq!(model.coefficient(k, Component::Imaginary, 1, 1), Some(0.3));
        assert_eq!(model.coefficient(k, Component::Imaginary, 0, 0), Some(0.0));
        assert_eq!(model.coefficient(k, Component::Real, 0, 1), Some(0.0));
    }
}

#[test]
fn degree_is_taken_from_header_when_absent() {
    let dir = TempDir::new().unwrap();
    let path = write_sph(&dir, "model.sph", &degree_one_sph());

    let model = CoefficientModel::from_sph_file(&path, None).unwrap();
    assert_eq!(model.degree(), 1);
    assert_eq!(model.knots(), &DEFAULT_KNOTS[..]);
    assert_eq!(model.inner_radius(), 3480.0);
    assert_eq!(model.outer_radius(), 6346.691);
}

#[test]
fn groups_may_wrap_across_lines() {
    // Degree 2 over three knots, each group split differently.
    let knots = vec![1.0, 0.0, -1.0];
    let mut text = String::from("2 111 3 111\n");
    for k in 0..3 {
        let base = (k * 10) as f64;
        writeln!(text, "{}", base).unwrap();
        writeln!(text, "{} {}\n{}", base + 1.0, base + 2.0, base + 3.0).unwrap();
        writeln!(
            text,
            "{}\n{} {}\n{} {}",
            base + 4.0,
            base + 5.0,
            base + 6.0,
            base + 7.0,
            base + 8.0
        )
        .unwrap();
    }

    let model = CoefficientModel::from_sph_stream(text.as_bytes(), Some(knots)).unwrap();
    for k in 0..3 {
        let base = (k * 10) as f64;
        let c = |component, l, m| model.coefficient(k, component, l, m).unwrap();
        assert_eq!(c(Component::Real, 0, 0), base);
        assert_eq!(c(Component::Real, 1, 0), base + 1.0);
        assert_eq!(c(Component::Real, 1, 1), base + 2.0);
        assert_eq!(c(Component::Imaginary, 1, 1), base + 3.0);
        assert_eq!(c(Component::Real, 2, 0), base + 4.0);
        assert_eq!(c(Component::Real, 2, 1), base + 5.0);
        assert_eq!(c(Component::Imaginary, 2, 1), base + 6.0);
        assert_eq!(c(Component::Real, 2, 2), base + 7.0);
        assert_eq!(c(Component::Imaginary, 2, 2), base + 8.0);
    }
}

#[test]
fn final_group_one_short_is_truncation() {
    let dir = TempDir::new().unwrap();
    let mut text = degree_one_sph();
    text.truncate(text.trim_end().len() - " 0.3".len());
    let path = write_sph(&dir, "short.sph", &text);

    let err = CoefficientModel::from_sph_file(&path, None).unwrap_err();
    assert!(matches!(err, SphError::Truncated { .. }), "{err}");
}

#[test]
fn constructor_degree_disagreeing_with_header_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_sph(&dir, "model.sph", &degree_one_sph());

    let err = CoefficientModel::from_config(&ModelConfig {
        filename: Some(path),
        degree: Some(2),
        ..ModelConfig::default()
    })
    .unwrap_err();
    assert!(matches!(
        err,
        SphError::ShapeMismatch { expected: 2, found: 1, .. }
    ));
}

#[test]
fn custom_knot_table_must_match_header() {
    let dir = TempDir::new().unwrap();
    let path = write_sph(&dir, "model.sph", &degree_one_sph());

    let err = CoefficientModel::from_sph_file(&path, Some(vec![1.0, 0.0, -1.0])).unwrap_err();
    assert!(matches!(
        err,
        SphError::ShapeMismatch { expected: 3, found: 21, .. }
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = CoefficientModel::from_sph_file(dir.path().join("absent.sph"), None).unwrap_err();
    assert!(matches!(err, SphError::Io(_)));
}

#[test]
fn reread_replaces_coefficients_of_same_shape() {
    let dir = TempDir::new().unwrap();
    let first = write_sph(&dir, "a.sph", &degree_one_sph());
    let second = write_sph(&dir, "b.sph", &degree_one_sph().replace("0.5", "-0.75"));

    let mut model = CoefficientModel::from_sph_file(&first, None).unwrap();
    model.read_sph_file(&second).unwrap();
    assert_eq!(model.coefficient(20, Component::Real, 0, 0), Some(-0.75));
    assert_eq!(model.coefficient(20, Component::Imaginary, 1, 1), Some(0.3));
}
