//! rpnkit is the stage-1 region-proposal pipeline of an anchor-based
//! single-stage detector.
//!
//! Given per-level classification and box-regression outputs plus a fixed
//! anchor set, the crate flattens the pyramid into one image-major proposal
//! space, reduces per-class scores to objectness, keeps the global top-N
//! and decodes the survivors against their matched anchors. Box decoding
//! and non-max suppression are external collaborators behind traits.
//! Optional parallelism via the `rayon` feature; instrumentation via the
//! `tracing` feature.

pub mod config;
pub mod proposal;
pub mod pyramid;
pub mod score;
mod trace;
pub mod util;

pub use config::ProposalConfig;
pub use proposal::{
    decode_selected, select_top_n, stage1_proposals, BoxDecoder, BoxEncoding, Proposals,
    StageOneProposals, Suppressor,
};
pub use pyramid::{flatten_pyramid, FlatPyramid, LevelOutput};
#[cfg(feature = "rayon")]
pub use score::objectness_par;
pub use score::Activation;
pub use util::{RpnError, RpnResult};
