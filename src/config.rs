//! Call-time configuration for the proposal pipeline.
//!
//! Loading and validation of configuration files is external; this is the
//! read-only value type handed to every pipeline call.

use crate::proposal::BoxEncoding;
use crate::score::Activation;

/// Read-only settings consumed by
/// [`stage1_proposals`](crate::stage1_proposals).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProposalConfig {
    /// Activation regime of the classification head.
    pub activation: Activation,
    /// Box-encoding scheme handed to the decoder collaborator.
    pub box_encoding: BoxEncoding,
    /// Proposals kept by the stage-1 selector. Must be positive.
    pub top_n: usize,
    /// Budget for the post-NMS consumer; carried through untouched, never
    /// applied by this crate.
    pub top_n_post_nms: Option<usize>,
}

impl Default for ProposalConfig {
    fn default() -> Self {
        Self {
            activation: Activation::Exclusive,
            box_encoding: BoxEncoding::CenterSize,
            top_n: 2000,
            top_n_post_nms: None,
        }
    }
}
