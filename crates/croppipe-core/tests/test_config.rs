use croppipe_core::config::{SelectorConfig, SessionConfig};
use croppipe_core::error::CropPipeError;
use croppipe_core::pipeline::Interpolation;

#[test]
fn test_default_config_values() {
    let c = SessionConfig::default();
    assert_eq!(c.selector.rect_size, 512.0);
    assert_eq!(c.selector.min_width, 100.0);
    assert_eq!(c.viewport.width, 1280.0);
    assert_eq!(c.resize.interpolation, Interpolation::Bilinear);
    assert_eq!(c.import.extensions, ["png", "jpg", "jpeg", "bmp", "gif"]);
    assert!(c.validate().is_ok());
}

#[test]
fn test_default_config_survives_toml() {
    let c = SessionConfig::default();
    let text = c.to_toml_string().unwrap();
    assert!(text.contains("[selector]"), "got: {text}");
    assert_eq!(SessionConfig::from_toml_str(&text).unwrap(), c);
}

#[test]
fn test_partial_toml_fills_defaults() {
    let c = SessionConfig::from_toml_str(
        r#"
        [selector]
        rect_size = 300.0

        [resize]
        interpolation = "Nearest"
        "#,
    )
    .unwrap();
    assert_eq!(c.selector.rect_size, 300.0);
    assert_eq!(c.selector.zoom_in_factor, 1.1);
    assert_eq!(c.resize.interpolation, Interpolation::Nearest);
    assert_eq!(c.viewport.height, 720.0);
}

#[test]
fn test_invalid_values_are_rejected() {
    for text in [
        "[selector]\nrect_size = 0.0",
        "[selector]\nzoom_in_factor = 0.5",
        "[selector]\nzoom_out_factor = 1.5",
        "[viewport]\nwidth = 0.0",
        "[selector]\nrect_size = \"big\"",
    ] {
        let err = SessionConfig::from_toml_str(text).unwrap_err();
        assert!(matches!(err, CropPipeError::Config(_)), "{text:?}: {err}");
    }
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.toml");
    std::fs::write(&path, "[viewport]\nwidth = 640.0\nheight = 480.0\n").unwrap();

    let c = SessionConfig::load(&path).unwrap();
    assert_eq!(c.viewport.width, 640.0);
    assert_eq!(c.selector, SelectorConfig::default());

    assert!(matches!(
        SessionConfig::load(&dir.path().join("missing.toml")),
        Err(CropPipeError::Io(_))
    ));
}
