//! Pyramid-level head outputs and the flattener that merges them.
//!
//! Each resolution level of the detection head produces a dense
//! `(images, channels, height, width)` pair: classification and box
//! regression. The flattener merges all levels into one row array per head,
//! laid out image-major so that flat row `image * A + position` addresses a
//! single anchor slot. The anchor set consumed downstream must be built in
//! the same level-concatenation order, which is guaranteed by construction,
//! not checked per row.

use ndarray::{concatenate, Array2, Array4, ArrayView2, ArrayView3, Axis};

use crate::util::{RpnError, RpnResult};

/// Classification and box-regression output of one pyramid level.
#[derive(Clone, Debug)]
pub struct LevelOutput {
    cls: Array4<f32>,
    reg: Array4<f32>,
}

impl LevelOutput {
    /// Pairs the two head outputs of a level.
    ///
    /// Both arrays are `(images, channels, height, width)`; they must agree
    /// on image count and spatial size, while their channel counts differ
    /// (classes vs. 4 coordinates per anchor slot).
    pub fn new(cls: Array4<f32>, reg: Array4<f32>) -> RpnResult<Self> {
        if reg.shape()[0] != cls.shape()[0] {
            return Err(RpnError::ShapeMismatch {
                expected: cls.shape()[0],
                got: reg.shape()[0],
                context: "regression image count",
            });
        }
        if reg.shape()[2..] != cls.shape()[2..] {
            return Err(RpnError::ShapeMismatch {
                expected: cls.shape()[2] * cls.shape()[3],
                got: reg.shape()[2] * reg.shape()[3],
                context: "regression spatial size",
            });
        }
        Ok(Self { cls, reg })
    }

    /// Number of images in the batch.
    pub fn images(&self) -> usize {
        self.cls.shape()[0]
    }

    /// Spatial positions (`height * width`) of this level.
    pub fn positions(&self) -> usize {
        self.cls.shape()[2] * self.cls.shape()[3]
    }

    /// Classification channels (classes, plus background under the
    /// exclusive activation).
    pub fn class_channels(&self) -> usize {
        self.cls.shape()[1]
    }

    /// Box-regression channels.
    pub fn box_channels(&self) -> usize {
        self.reg.shape()[1]
    }
}

/// Flattened pyramid: one row per (image, position) pair.
///
/// Rows are image-major, position-minor; positions follow the input level
/// order. Produced by [`flatten_pyramid`].
#[derive(Clone, Debug)]
pub struct FlatPyramid {
    cls: Array2<f32>,
    reg: Array2<f32>,
    images: usize,
    positions: usize,
}

impl FlatPyramid {
    /// Classification rows, `(images * positions, class_channels)`.
    pub fn cls(&self) -> ArrayView2<'_, f32> {
        self.cls.view()
    }

    /// Box-regression rows, `(images * positions, box_channels)`.
    pub fn reg(&self) -> ArrayView2<'_, f32> {
        self.reg.view()
    }

    /// Number of images in the batch.
    pub fn images(&self) -> usize {
        self.images
    }

    /// Total spatial positions summed over all levels.
    ///
    /// Must equal the anchor-set size for flat-index decomposition to hold.
    pub fn positions(&self) -> usize {
        self.positions
    }

    /// Total proposal rows, `images * positions`.
    pub fn rows(&self) -> usize {
        self.images * self.positions
    }
}

/// Merges per-level head outputs into flat per-anchor row arrays.
///
/// Each level is reshaped to `(N, C, H*W)`, transposed to put positions on
/// rows, and the levels are concatenated along the position axis in input
/// order. Pure transform: inputs are only read.
pub fn flatten_pyramid(levels: &[LevelOutput]) -> RpnResult<FlatPyramid> {
    let first = levels
        .first()
        .ok_or(RpnError::InvalidInput("pyramid has no levels"))?;
    let images = first.images();
    let class_channels = first.class_channels();
    let box_channels = first.box_channels();

    for level in &levels[1..] {
        if level.images() != images {
            return Err(RpnError::ShapeMismatch {
                expected: images,
                got: level.images(),
                context: "level image count",
            });
        }
        if level.class_channels() != class_channels {
            return Err(RpnError::ShapeMismatch {
                expected: class_channels,
                got: level.class_channels(),
                context: "class channels",
            });
        }
        if level.box_channels() != box_channels {
            return Err(RpnError::ShapeMismatch {
                expected: box_channels,
                got: level.box_channels(),
                context: "box channels",
            });
        }
    }

    let positions: usize = levels.iter().map(LevelOutput::positions).sum();
    let cls = flatten_head(levels, images, class_channels, positions, |level| {
        &level.cls
    })?;
    let reg = flatten_head(levels, images, box_channels, positions, |level| &level.reg)?;

    Ok(FlatPyramid {
        cls,
        reg,
        images,
        positions,
    })
}

fn flatten_head<'a>(
    levels: &'a [LevelOutput],
    images: usize,
    channels: usize,
    positions: usize,
    head: impl Fn(&'a LevelOutput) -> &'a Array4<f32>,
) -> RpnResult<Array2<f32>> {
    let mut per_level: Vec<ArrayView3<'a, f32>> = Vec::with_capacity(levels.len());
    for level in levels {
        let array = head(level);
        let reshaped = array
            .view()
            .into_shape_with_order((images, channels, level.positions()))
            .map_err(|_| RpnError::ShapeMismatch {
                expected: images * channels * level.positions(),
                got: array.len(),
                context: "level elements",
            })?;
        per_level.push(reshaped.permuted_axes([0, 2, 1]));
    }

    let merged = concatenate(Axis(1), &per_level)
        .map_err(|_| RpnError::InvalidInput("pyramid levels cannot be concatenated"))?;
    // Owned, freshly copied and exactly (images, positions, channels); the
    // final reshape cannot fail once the layout is standard.
    let flat = merged
        .as_standard_layout()
        .into_owned()
        .into_shape_with_order((images * positions, channels))
        .expect("merged head is contiguous");
    Ok(flat)
}
