//! Global top-N selection over the flattened proposal space.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::score::Activation;
use crate::util::{RpnError, RpnResult};

/// Top-N candidates selected before box decoding.
///
/// All fields are parallel sequences in descending-objectness order, of
/// length `min(top_n, images * anchors)`.
#[derive(Clone, Debug)]
pub struct StageOneProposals {
    deltas: Array2<f32>,
    scores: Array2<f32>,
    objectness: Array1<f32>,
    image_ids: Vec<usize>,
    anchor_ids: Vec<usize>,
    anchors: Array2<f32>,
}

impl StageOneProposals {
    /// Selected box-regression rows, still anchor-relative.
    pub fn deltas(&self) -> ArrayView2<'_, f32> {
        self.deltas.view()
    }

    /// Per-class probability rows of the selected candidates.
    pub fn scores(&self) -> ArrayView2<'_, f32> {
        self.scores.view()
    }

    /// Objectness of the selected candidates; non-increasing.
    pub fn objectness(&self) -> ArrayView1<'_, f32> {
        self.objectness.view()
    }

    /// Owning image of each candidate.
    pub fn image_ids(&self) -> &[usize] {
        &self.image_ids
    }

    /// Anchor index of each candidate within the shared anchor set.
    pub fn anchor_ids(&self) -> &[usize] {
        &self.anchor_ids
    }

    /// Matched anchor rows, gathered by anchor index.
    pub fn anchors(&self) -> ArrayView2<'_, f32> {
        self.anchors.view()
    }

    /// Number of selected candidates.
    pub fn len(&self) -> usize {
        self.image_ids.len()
    }

    /// Whether the selection is empty.
    pub fn is_empty(&self) -> bool {
        self.image_ids.is_empty()
    }
}

/// Flat indices sorted by strictly descending objectness, ties broken by
/// the original flat index so repeated runs produce identical output.
fn rank_desc(objectness: &Array1<f32>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..objectness.len()).collect();
    order.sort_by(|&a, &b| objectness[b].total_cmp(&objectness[a]).then_with(|| a.cmp(&b)));
    order
}

/// Selects the `top_n` highest-objectness rows across the whole batch.
///
/// `reg` and `probs` are the flattened image-major row arrays; `anchors` is
/// the `(A, 4)` anchor set shared by every image. Flat row `f` decomposes as
/// `image = f / A`, `anchor = f % A`; both divisions are plain `usize`
/// arithmetic, so no rounding mode can skew the decomposition.
///
/// Ranking is global across the batch rather than per image: an image whose
/// scores run generally higher can claim the entire budget. Downstream
/// per-image grouping must tolerate images contributing zero proposals.
pub fn select_top_n(
    reg: ArrayView2<'_, f32>,
    probs: ArrayView2<'_, f32>,
    anchors: ArrayView2<'_, f32>,
    activation: Activation,
    top_n: usize,
) -> RpnResult<StageOneProposals> {
    if top_n == 0 {
        return Err(RpnError::InvalidInput("top_n must be positive"));
    }
    if probs.nrows() != reg.nrows() {
        return Err(RpnError::ShapeMismatch {
            expected: reg.nrows(),
            got: probs.nrows(),
            context: "probability rows",
        });
    }
    if anchors.ncols() != 4 {
        return Err(RpnError::ShapeMismatch {
            expected: 4,
            got: anchors.ncols(),
            context: "anchor columns",
        });
    }
    let num_anchors = anchors.nrows();
    if num_anchors == 0 {
        return Err(RpnError::InvalidInput("anchor set is empty"));
    }
    if reg.nrows() % num_anchors != 0 {
        return Err(RpnError::ShapeMismatch {
            expected: 0,
            got: reg.nrows() % num_anchors,
            context: "proposal rows modulo anchor count",
        });
    }

    #[cfg(feature = "rayon")]
    let objectness = crate::score::objectness_par(activation, probs)?;
    #[cfg(not(feature = "rayon"))]
    let objectness = activation.objectness(probs)?;

    let order = rank_desc(&objectness);
    let keep = top_n.min(order.len());
    let selected = &order[..keep];

    let mut image_ids = Vec::with_capacity(keep);
    let mut anchor_ids = Vec::with_capacity(keep);
    for &flat in selected {
        image_ids.push(flat / num_anchors);
        anchor_ids.push(flat % num_anchors);
    }

    Ok(StageOneProposals {
        deltas: reg.select(Axis(0), selected),
        scores: probs.select(Axis(0), selected),
        objectness: objectness.select(Axis(0), selected),
        anchors: anchors.select(Axis(0), &anchor_ids),
        image_ids,
        anchor_ids,
    })
}
