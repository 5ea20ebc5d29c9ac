mod common;

use proptest::prelude::*;

use croppipe_core::error::CropPipeError;
use croppipe_core::geometry::PixelRect;
use croppipe_core::pipeline::{
    Interpolation, PipelineTracker, ResizeSpec, Stage, StageState,
};

fn fully_processed() -> PipelineTracker {
    let mut p = PipelineTracker::new(800, 600);
    p.set_crop(PixelRect::new(0, 0, 400, 300)).unwrap();
    p.set_resize(ResizeSpec::new(200, 150).unwrap()).unwrap();
    p.set_infer("sky").unwrap();
    p.set_fix("remove wires").unwrap();
    p
}

#[test]
fn test_new_tracker_has_no_stage() {
    let p = PipelineTracker::new(800, 600);
    assert_eq!(p.state(), StageState::None);
    assert_eq!(p.state().to_string(), "00000");
    assert!(p.roi().is_none());
    assert!(!p.is_cropped());
}

#[test]
fn test_stages_advance_in_order() {
    let mut p = PipelineTracker::new(800, 600);
    let s = p.set_crop(PixelRect::new(10, 10, 100, 100)).unwrap();
    assert_eq!(s.to_string(), "10000");
    let s = p.set_resize(ResizeSpec::new(50, 50).unwrap()).unwrap();
    assert_eq!(s.to_string(), "11000");
    let s = p.set_infer("prompt").unwrap();
    assert_eq!(s.to_string(), "11100");
    let s = p.set_fix("fix").unwrap();
    assert_eq!(s.to_string(), "11110");
    assert!(p.is_fixed() && p.is_inferred() && p.is_resized() && p.is_cropped());
    assert_eq!(p.infer_prompt(), Some("prompt"));
    assert_eq!(p.fix_prompt(), Some("fix"));
}

#[test]
fn test_recrop_invalidates_downstream() {
    let mut p = fully_processed();
    let s = p.set_crop(PixelRect::new(5, 5, 50, 50)).unwrap();

    assert_eq!(s, StageState::Cropped);
    assert_eq!(p.roi(), Some(PixelRect::new(5, 5, 50, 50)));
    assert!(p.resize_spec().is_none());
    assert!(p.infer_prompt().is_none());
    assert!(p.fix_prompt().is_none());
}

#[test]
fn test_reresize_keeps_crop_and_drops_later_stages() {
    let mut p = fully_processed();
    let s = p.set_resize(ResizeSpec::new(64, 64).unwrap()).unwrap();

    assert_eq!(s, StageState::Resized);
    assert!(p.roi().is_some());
    assert_eq!(p.resize_spec(), Some(ResizeSpec::new(64, 64).unwrap()));
    assert!(p.infer_prompt().is_none());
    assert!(p.fix_prompt().is_none());
}

#[test]
fn test_out_of_order_stage_is_rejected() {
    let mut p = PipelineTracker::new(800, 600);
    let err = p.set_resize(ResizeSpec::new(10, 10).unwrap()).unwrap_err();
    assert!(matches!(
        err,
        CropPipeError::StageOutOfOrder {
            stage: Stage::Resize,
            requires: Stage::Crop
        }
    ));
    assert!(p.set_fix("x").is_err());
    assert_eq!(p.state(), StageState::None);
}

#[test]
fn test_invalid_crop_is_rejected() {
    let mut p = PipelineTracker::new(800, 600);
    assert!(matches!(
        p.set_crop(PixelRect::new(700, 0, 200, 100)),
        Err(CropPipeError::InvalidCrop(_))
    ));
    assert!(p.set_crop(PixelRect::new(0, 0, 0, 100)).is_err());
    assert_eq!(p.state(), StageState::None);
}

#[test]
fn test_clear_crop_resets_everything() {
    let mut p = fully_processed();
    assert_eq!(p.clear_crop(), StageState::None);
    assert!(p.roi().is_none());
    assert!(p.resize_spec().is_none());
    assert!(p.fix_prompt().is_none());
}

#[test]
fn test_reset_and_latest_stage() {
    let mut p = fully_processed();
    assert_eq!(p.state().latest_stage(), Some(Stage::Fix));
    p.reset();
    assert_eq!(p.state(), StageState::None);
    assert_eq!(p.state().latest_stage(), None);
    assert!(p.infer_prompt().is_none());
    assert!(p.set_crop(PixelRect::new(0, 0, 800, 600)).is_ok());
}

#[test]
fn test_bits_round_trip_and_reject_gaps() {
    for state in [
        StageState::None,
        StageState::Cropped,
        StageState::Resized,
        StageState::Inferred,
        StageState::Fixed,
    ] {
        assert_eq!(StageState::from_bits(state.bits()), Some(state));
    }
    assert_eq!(StageState::from_bits(0b01000), None);
    assert_eq!(StageState::from_bits(0b10100), None);
}

#[test]
fn test_status_colors() {
    assert_eq!(StageState::None.status_color(), [200, 200, 200]);
    assert_eq!(StageState::Cropped.status_color(), [255, 165, 0]);
    assert_eq!(StageState::Resized.status_color(), [0, 0, 255]);
    assert_eq!(StageState::Inferred.status_color(), [0, 128, 0]);
    assert_eq!(StageState::Fixed.status_color(), [255, 0, 0]);
}

#[test]
fn test_resize_spec_parse() {
    assert_eq!(
        "1024x768".parse::<ResizeSpec>().unwrap(),
        ResizeSpec::new(1024, 768).unwrap()
    );
    assert_eq!(
        " 64 X 32 ".parse::<ResizeSpec>().unwrap().to_string(),
        "64x32"
    );
    assert!("0x10".parse::<ResizeSpec>().is_err());
    assert!("1024".parse::<ResizeSpec>().is_err());
    assert!("ax10".parse::<ResizeSpec>().is_err());
}

#[test]
fn test_cropped_view_matches_source_pixels() {
    let mut record = common::make_record(1, 80, 60);
    record
        .pipeline_mut()
        .set_crop(PixelRect::new(10, 20, 30, 15))
        .unwrap();
    let view = record.cropped_view();
    assert_eq!(view.dimensions(), (30, 15));
    assert_eq!(view.get_pixel(0, 0), record.pixels().get_pixel(10, 20));
    assert_eq!(view.get_pixel(29, 14), record.pixels().get_pixel(39, 34));
}

#[test]
fn test_resized_view_dimensions() {
    let mut record = common::make_record(1, 80, 60);
    assert_eq!(record.resized_view(Interpolation::Bilinear).dimensions(), (80, 60));

    record
        .pipeline_mut()
        .set_crop(PixelRect::new(0, 0, 40, 40))
        .unwrap();
    record
        .pipeline_mut()
        .set_resize(ResizeSpec::new(16, 8).unwrap())
        .unwrap();
    assert_eq!(record.resized_view(Interpolation::Nearest).dimensions(), (16, 8));
    assert_eq!(record.resized_view(Interpolation::Bilinear).dimensions(), (16, 8));
}

#[derive(Clone, Debug)]
enum Op {
    Crop,
    Resize,
    Infer,
    Fix,
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Crop),
        Just(Op::Resize),
        Just(Op::Infer),
        Just(Op::Fix),
        Just(Op::Clear),
    ]
}

proptest! {
    #[test]
    fn prop_state_is_always_a_stage_prefix(ops in prop::collection::vec(op(), 0..20)) {
        let mut p = PipelineTracker::new(100, 100);
        for op in ops {
            let _ = match op {
                Op::Crop => p.set_crop(PixelRect::new(0, 0, 10, 10)),
                Op::Resize => p.set_resize(ResizeSpec::new(5, 5).unwrap()),
                Op::Infer => p.set_infer("a"),
                Op::Fix => p.set_fix("b"),
                Op::Clear => Ok(p.clear_crop()),
            };
            let state = p.state();
            prop_assert_eq!(StageState::from_bits(state.bits()), Some(state));
            prop_assert_eq!(p.roi().is_some(), p.is_cropped());
            prop_assert_eq!(p.resize_spec().is_some(), p.is_resized());
            prop_assert_eq!(p.infer_prompt().is_some(), p.is_inferred());
            prop_assert_eq!(p.fix_prompt().is_some(), p.is_fixed());
        }
    }
}
