//! Box-decoding adapter and the external collaborator contracts.
//!
//! The pipeline owns no decoding or suppression math. Both collaborators
//! are expressed as traits so callers plug in their own implementations;
//! the adapter here only gathers, delegates and verifies the contract.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::proposal::{Proposals, StageOneProposals};
use crate::util::{RpnError, RpnResult};

/// Named parametrization used to express a box relative to its anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxEncoding {
    /// Deltas on the anchor center and log-size (the classic R-CNN
    /// encoding).
    CenterSize,
    /// Offsets on the anchor's corner coordinates.
    CornerOffset,
}

impl FromStr for BoxEncoding {
    type Err = RpnError;

    fn from_str(name: &str) -> RpnResult<Self> {
        match name {
            "center-size" | "fastrcnn" => Ok(Self::CenterSize),
            "corner-offset" | "corner" => Ok(Self::CornerOffset),
            _ => Err(RpnError::UnsupportedEncoding {
                name: name.to_owned(),
            }),
        }
    }
}

impl fmt::Display for BoxEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CenterSize => f.write_str("center-size"),
            Self::CornerOffset => f.write_str("corner-offset"),
        }
    }
}

/// External box-decoding collaborator.
///
/// Maps regression rows and their matched anchor rows to absolute
/// coordinates under the given encoding: same row count out, 4 columns.
pub trait BoxDecoder {
    /// Decodes `deltas` against `anchors` into absolute box rows.
    fn decode(
        &self,
        deltas: ArrayView2<'_, f32>,
        anchors: ArrayView2<'_, f32>,
        encoding: BoxEncoding,
    ) -> RpnResult<Array2<f32>>;
}

/// Downstream non-max-suppression collaborator.
///
/// Runs after this pipeline and is never called by it; the contract lives
/// here so the boundary is written down once. Returned indices address rows
/// of `boxes` that survive suppression.
pub trait Suppressor {
    /// Suppresses overlapping boxes above `overlap_threshold`.
    fn suppress(
        &self,
        boxes: ArrayView2<'_, f32>,
        scores: ArrayView1<'_, f32>,
        overlap_threshold: f32,
    ) -> RpnResult<Vec<usize>>;
}

/// Decodes the selected candidates against their matched anchors.
///
/// Gather-and-delegate only. The decoder's output is checked against its
/// row-count/4-column contract before being accepted; a collaborator that
/// violates it surfaces as [`RpnError::ShapeMismatch`] instead of corrupt
/// boxes downstream.
pub fn decode_selected<D: BoxDecoder>(
    selected: &StageOneProposals,
    decoder: &D,
    encoding: BoxEncoding,
) -> RpnResult<Proposals> {
    let boxes = decoder.decode(selected.deltas(), selected.anchors(), encoding)?;
    if boxes.nrows() != selected.len() {
        return Err(RpnError::ShapeMismatch {
            expected: selected.len(),
            got: boxes.nrows(),
            context: "decoded box rows",
        });
    }
    if boxes.ncols() != 4 {
        return Err(RpnError::ShapeMismatch {
            expected: 4,
            got: boxes.ncols(),
            context: "decoded box columns",
        });
    }
    Ok(Proposals {
        boxes,
        scores: selected.scores().to_owned(),
        image_ids: selected.image_ids().to_vec(),
        anchors: selected.anchors().to_owned(),
    })
}
