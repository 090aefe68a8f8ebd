//! Objectness scoring and classification-target helpers.
//!
//! [`Activation`] is the single confidence policy shared by the inference
//! scorer and the training-target builder: both branch on the same two
//! regimes, so the branching lives here once.

use std::fmt;
use std::str::FromStr;

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::util::{RpnError, RpnResult};

/// Per-class activation regime of the classification head.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// Softmax-style: classes are mutually exclusive and column 0 is the
    /// background class.
    Exclusive,
    /// Sigmoid-style: classes are scored independently, no background
    /// column.
    Independent,
}

impl FromStr for Activation {
    type Err = RpnError;

    /// Parses a configuration name. The legacy `softmax`/`sigmoid`
    /// spellings are accepted as aliases.
    fn from_str(name: &str) -> RpnResult<Self> {
        match name {
            "exclusive" | "softmax" => Ok(Self::Exclusive),
            "independent" | "sigmoid" => Ok(Self::Independent),
            _ => Err(RpnError::UnsupportedActivation {
                name: name.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclusive => f.write_str("exclusive"),
            Self::Independent => f.write_str("independent"),
        }
    }
}

impl Activation {
    /// Reduces per-class probabilities to one foreground confidence per row.
    ///
    /// `Exclusive` reads `1 - probs[:, 0]`; `Independent` takes the row
    /// maximum. Values pass through without clamping, so the output is only
    /// bounded to `[0, 1]` if the input already is.
    pub fn objectness(self, probs: ArrayView2<'_, f32>) -> RpnResult<Array1<f32>> {
        check_class_columns(probs)?;
        let scores = match self {
            Self::Exclusive => probs.column(0).mapv(|background| 1.0 - background),
            Self::Independent => probs.rows().into_iter().map(row_max).collect(),
        };
        Ok(scores)
    }

    /// Builds one-hot classification targets for integer labels.
    ///
    /// Labels index the full class set including background at 0. Under
    /// `Independent` the background column is dropped from the output so
    /// the row width matches the scorer's class-count convention.
    pub fn one_hot(self, labels: &[usize], num_classes: usize) -> RpnResult<Array2<f32>> {
        let columns = match self {
            Self::Exclusive => num_classes,
            Self::Independent => num_classes + 1,
        };
        let mut targets = Array2::zeros((labels.len(), columns));
        for (row, &label) in labels.iter().enumerate() {
            if label >= columns {
                return Err(RpnError::ClassLabelOutOfRange {
                    label,
                    classes: columns,
                });
            }
            targets[[row, label]] = 1.0;
        }
        match self {
            Self::Exclusive => Ok(targets),
            Self::Independent => Ok(targets.slice(s![.., 1..]).to_owned()),
        }
    }
}

/// Row-parallel objectness, identical results to [`Activation::objectness`].
#[cfg(feature = "rayon")]
pub fn objectness_par(
    activation: Activation,
    probs: ArrayView2<'_, f32>,
) -> RpnResult<Array1<f32>> {
    check_class_columns(probs)?;
    let scores: Vec<f32> = (0..probs.nrows())
        .into_par_iter()
        .map(|row| match activation {
            Activation::Exclusive => 1.0 - probs[[row, 0]],
            Activation::Independent => row_max(probs.row(row)),
        })
        .collect();
    Ok(Array1::from_vec(scores))
}

fn check_class_columns(probs: ArrayView2<'_, f32>) -> RpnResult<()> {
    if probs.ncols() == 0 {
        return Err(RpnError::ShapeMismatch {
            expected: 1,
            got: 0,
            context: "class columns",
        });
    }
    Ok(())
}

fn row_max(row: ArrayView1<'_, f32>) -> f32 {
    row.fold(f32::NEG_INFINITY, |max, &p| max.max(p))
}

#[cfg(test)]
mod tests {
    use super::Activation;
    use crate::util::RpnError;

    #[test]
    fn parses_spec_names_and_legacy_aliases() {
        assert_eq!("exclusive".parse::<Activation>(), Ok(Activation::Exclusive));
        assert_eq!("softmax".parse::<Activation>(), Ok(Activation::Exclusive));
        assert_eq!(
            "independent".parse::<Activation>(),
            Ok(Activation::Independent)
        );
        assert_eq!("sigmoid".parse::<Activation>(), Ok(Activation::Independent));
    }

    #[test]
    fn rejects_unknown_activation_names() {
        let err = "relu".parse::<Activation>().err().unwrap();
        assert_eq!(
            err,
            RpnError::UnsupportedActivation {
                name: "relu".to_owned(),
            }
        );
    }

    #[test]
    fn display_uses_canonical_names() {
        assert_eq!(Activation::Exclusive.to_string(), "exclusive");
        assert_eq!(Activation::Independent.to_string(), "independent");
    }
}
