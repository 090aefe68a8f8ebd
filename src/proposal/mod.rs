//! Stage-1 proposal generation: flatten, score, rank, decode.

mod decode;
mod topn;

pub use decode::{decode_selected, BoxDecoder, BoxEncoding, Suppressor};
pub use topn::{select_top_n, StageOneProposals};

use ndarray::{Array2, ArrayView2};

use crate::config::ProposalConfig;
use crate::pyramid::{flatten_pyramid, LevelOutput};
use crate::trace::{trace_event, trace_span};
use crate::util::{RpnError, RpnResult};

/// Decoded stage-1 proposal set.
///
/// Four parallel sequences in descending-objectness order; discarded after
/// downstream consumption (NMS and per-class filtering happen elsewhere).
#[derive(Clone, Debug)]
pub struct Proposals {
    /// Absolute box coordinates, one row of 4 per proposal.
    pub boxes: Array2<f32>,
    /// Per-class probability rows matching the selection order.
    pub scores: Array2<f32>,
    /// Owning image of each proposal.
    pub image_ids: Vec<usize>,
    /// Anchor each proposal was decoded against.
    pub anchors: Array2<f32>,
}

/// Runs the full stage-1 pipeline over one batch of pyramid outputs.
///
/// `anchors` is the `(A, 4)` anchor set shared by every image, built in the
/// same level-concatenation order the flattener uses; `A` must equal the
/// pyramid's total position count and is checked here, at the first point
/// where anchors and pyramid outputs meet. Classification inputs are
/// expected to be already-activated probabilities; the scorer neither
/// activates nor clamps.
///
/// Ranking is global across the batch, so a confident image can leave
/// another with no proposals at all. That is intentional; downstream
/// grouping must tolerate it.
pub fn stage1_proposals<D: BoxDecoder>(
    levels: &[LevelOutput],
    anchors: ArrayView2<'_, f32>,
    config: &ProposalConfig,
    decoder: &D,
) -> RpnResult<Proposals> {
    let _span = trace_span!(
        "stage1_proposals",
        levels = levels.len(),
        top_n = config.top_n
    )
    .entered();

    let flat = flatten_pyramid(levels)?;
    if anchors.nrows() != flat.positions() {
        return Err(RpnError::ShapeMismatch {
            expected: flat.positions(),
            got: anchors.nrows(),
            context: "anchor count",
        });
    }

    let selected = select_top_n(
        flat.reg(),
        flat.cls(),
        anchors,
        config.activation,
        config.top_n,
    )?;
    trace_event!("stage1_selected", count = selected.len());

    decode_selected(&selected, decoder, config.box_encoding)
}
