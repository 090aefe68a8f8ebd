use ndarray::Array4;
use rpnkit::{flatten_pyramid, LevelOutput, RpnError};

/// Level where every element encodes (image, channel, level, position) so
/// row layout can be verified by value.
fn tagged_level(images: usize, cls_ch: usize, reg_ch: usize, h: usize, w: usize, tag: usize) -> LevelOutput {
    let cls = Array4::from_shape_fn((images, cls_ch, h, w), |(n, c, y, x)| {
        (n * 1000 + c * 100 + tag * 10 + y * w + x) as f32
    });
    let reg = Array4::from_shape_fn((images, reg_ch, h, w), |(n, c, y, x)| {
        -((n * 1000 + c * 100 + tag * 10 + y * w + x) as f32)
    });
    LevelOutput::new(cls, reg).unwrap()
}

#[test]
fn flat_shapes_match_batch_and_position_totals() {
    let levels = vec![
        tagged_level(3, 2, 4, 4, 4, 0),
        tagged_level(3, 2, 4, 2, 2, 1),
        tagged_level(3, 2, 4, 1, 1, 2),
    ];
    let flat = flatten_pyramid(&levels).unwrap();

    let total = 16 + 4 + 1;
    assert_eq!(flat.images(), 3);
    assert_eq!(flat.positions(), total);
    assert_eq!(flat.rows(), 3 * total);
    assert_eq!(flat.cls().dim(), (3 * total, 2));
    assert_eq!(flat.reg().dim(), (3 * total, 4));
}

#[test]
fn rows_are_image_major_with_levels_concatenated_in_order() {
    // Two images, level 0 has 2 positions (1x2), level 1 has 1 (1x1).
    let levels = vec![tagged_level(2, 2, 3, 1, 2, 0), tagged_level(2, 2, 3, 1, 1, 1)];
    let flat = flatten_pyramid(&levels).unwrap();
    let cls = flat.cls();

    // Image 0: level-0 positions 0 and 1, then level-1 position 0.
    assert_eq!(cls[[0, 0]], 0.0);
    assert_eq!(cls[[0, 1]], 100.0);
    assert_eq!(cls[[1, 0]], 1.0);
    assert_eq!(cls[[1, 1]], 101.0);
    assert_eq!(cls[[2, 0]], 10.0);
    assert_eq!(cls[[2, 1]], 110.0);
    // Image 1 starts at row positions() = 3.
    assert_eq!(cls[[3, 0]], 1000.0);
    assert_eq!(cls[[4, 0]], 1001.0);
    assert_eq!(cls[[5, 0]], 1010.0);
    assert_eq!(cls[[5, 1]], 1110.0);

    let reg = flat.reg();
    assert_eq!(reg[[0, 0]], 0.0);
    assert_eq!(reg[[3, 2]], -1200.0);
    assert_eq!(reg[[5, 0]], -1010.0);
}

#[test]
fn flatten_is_pure_and_repeatable() {
    let levels = vec![tagged_level(2, 1, 4, 2, 2, 0), tagged_level(2, 1, 4, 1, 1, 1)];
    let first = flatten_pyramid(&levels).unwrap();
    let second = flatten_pyramid(&levels).unwrap();
    assert_eq!(first.cls(), second.cls());
    assert_eq!(first.reg(), second.reg());
}

#[test]
fn rejects_empty_pyramid() {
    let err = flatten_pyramid(&[]).err().unwrap();
    assert_eq!(err, RpnError::InvalidInput("pyramid has no levels"));
}

#[test]
fn rejects_levels_that_disagree_on_image_count() {
    let levels = vec![tagged_level(2, 1, 4, 2, 2, 0), tagged_level(3, 1, 4, 1, 1, 1)];
    let err = flatten_pyramid(&levels).err().unwrap();
    assert_eq!(
        err,
        RpnError::ShapeMismatch {
            expected: 2,
            got: 3,
            context: "level image count",
        }
    );
}

#[test]
fn rejects_levels_that_disagree_on_channels() {
    let levels = vec![tagged_level(2, 1, 4, 2, 2, 0), tagged_level(2, 2, 4, 1, 1, 1)];
    let err = flatten_pyramid(&levels).err().unwrap();
    assert_eq!(
        err,
        RpnError::ShapeMismatch {
            expected: 1,
            got: 2,
            context: "class channels",
        }
    );
}

#[test]
fn level_output_rejects_mismatched_heads() {
    let cls = Array4::<f32>::zeros((2, 1, 2, 2));
    let reg = Array4::<f32>::zeros((3, 4, 2, 2));
    let err = LevelOutput::new(cls, reg).err().unwrap();
    assert_eq!(
        err,
        RpnError::ShapeMismatch {
            expected: 2,
            got: 3,
            context: "regression image count",
        }
    );

    let cls = Array4::<f32>::zeros((2, 1, 2, 2));
    let reg = Array4::<f32>::zeros((2, 4, 1, 2));
    let err = LevelOutput::new(cls, reg).err().unwrap();
    assert_eq!(
        err,
        RpnError::ShapeMismatch {
            expected: 4,
            got: 2,
            context: "regression spatial size",
        }
    );
}
