//! Weight vector operators for the genetic optimizer.
//!
//! Genes are policy weights bounded to [`GENE_MIN`]..=[`GENE_MAX`]. The
//! operators here work in place on flat weight slices, so they apply directly
//! to [`Policy::weights_mut`](crate::Policy::weights_mut).
//!
//! # Operations
//!
//! - **Initialization**: [`randomize`] draws every gene uniformly from the
//!   gene range
//! - **Crossover**: [`uniform_crossover`] and [`single_point_crossover`] turn
//!   two parent copies into two children
//! - **Mutation**: [`mutate`] applies bounded uniform perturbations

use rand::Rng;

pub const GENE_MIN: f32 = -1.0;
pub const GENE_MAX: f32 = 1.0;

/// Overwrites every gene with a uniform sample from `[GENE_MIN, GENE_MAX]`.
pub fn randomize<R>(weights: &mut [f32], rng: &mut R)
where
    R: Rng + ?Sized,
{
    for w in weights {
        *w = rng.random_range(GENE_MIN..=GENE_MAX);
    }
}

/// Uniform crossover between two parent copies.
///
/// Each gene position is swapped between `a` and `b` with probability 0.5,
/// so afterwards every gene of each child comes from one parent or the
/// other.
///
/// # Panics
///
/// Panics if the two vectors have different lengths.
pub fn uniform_crossover<R>(a: &mut [f32], b: &mut [f32], rng: &mut R)
where
    R: Rng + ?Sized,
{
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter_mut().zip(b) {
        if rng.random_bool(0.5) {
            std::mem::swap(x, y);
        }
    }
}

/// Single-point crossover between two parent copies.
///
/// Picks a cut index in `1..len` and swaps the tails, so each child keeps at
/// least its own first gene and takes at least the other parent's last gene.
/// Vectors shorter than two genes are left unchanged.
///
/// # Panics
///
/// Panics if the two vectors have different lengths.
pub fn single_point_crossover<R>(a: &mut [f32], b: &mut [f32], rng: &mut R)
where
    R: Rng + ?Sized,
{
    assert_eq!(a.len(), b.len());
    if a.len() < 2 {
        return;
    }
    let cut = rng.random_range(1..a.len());
    a[cut..].swap_with_slice(&mut b[cut..]);
}

/// Applies uniform mutation in place.
///
/// Each gene, with probability `rate`, is shifted by a sample from
/// `U[-step, step]` and clamped back into the gene range.
///
/// # Panics
///
/// Panics if `rate` is outside `[0, 1]` or `step` is negative.
pub fn mutate<R>(weights: &mut [f32], rate: f32, step: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for w in weights {
        if rng.random_bool(rate.into()) {
            *w = (*w + rng.random_range(-step..=step)).clamp(GENE_MIN, GENE_MAX);
        }
    }
}
