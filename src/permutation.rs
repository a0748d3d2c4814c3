//! Vertex permutations: validated bijections on `0..n`.

use rand::seq::SliceRandom;
use rand::Rng;

/// A bijection on `0..len`, stored as the image of each point.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// Builds a permutation from the images of `0, 1, ...`.
    ///
    /// Returns `None` unless every value in `0..len` appears exactly once.
    pub fn new(values: impl IntoIterator<Item = usize>) -> Option<Self> {
        let vec: Vec<usize> = values.into_iter().collect();
        let n = vec.len();
        let mut seen = vec![false; n];

        for &value in &vec {
            if value >= n || seen[value] {
                return None;
            }
            seen[value] = true;
        }
        Some(Self(vec))
    }

    /// Wraps images already known to form a bijection.
    pub(crate) fn from_images_unchecked(images: Vec<usize>) -> Self {
        debug_assert!(Self::new(images.iter().copied()).is_some());
        Self(images)
    }

    /// The identity on `0..size`.
    pub fn identity(size: usize) -> Self {
        Self((0..size).collect())
    }

    /// A uniformly random permutation of `0..size`.
    pub fn random<R: Rng>(rng: &mut R, size: usize) -> Self {
        let mut images: Vec<usize> = (0..size).collect();
        images.shuffle(rng);
        Self(images)
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the permutation of the empty set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Image of `v`.
    #[inline(always)]
    pub fn apply(&self, v: usize) -> usize {
        self.0[v]
    }

    /// The images as a slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// The inverse bijection.
    pub fn inverse(&self) -> Self {
        let mut inv = vec![0; self.0.len()];
        for (v, &image) in self.0.iter().enumerate() {
            inv[image] = v;
        }
        Self(inv)
    }

    /// `self` followed by `then`: maps `v` to `then.apply(self.apply(v))`.
    ///
    /// # Panics
    /// Panics if the two permutations have different sizes.
    pub fn then(&self, then: &Self) -> Self {
        assert_eq!(self.len(), then.len(), "permutation size mismatch");
        Self(self.0.iter().map(|&v| then.apply(v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn test_valid_permutations() {
        assert!(Permutation::new([0, 1, 2]).is_some());
        assert!(Permutation::new([2, 0, 1]).is_some());
        assert!(Permutation::new(vec![0]).is_some());
        assert!(Permutation::new(Vec::<usize>::new()).is_some());
    }

    #[test]
    fn test_invalid_permutations() {
        assert!(Permutation::new([0, 2]).is_none());
        assert!(Permutation::new([0, 1, 1]).is_none());
        assert!(Permutation::new([1, 2, 3]).is_none());
    }

    #[test]
    fn inverse_undoes_apply() {
        let mut rng = XorShiftRng::seed_from_u64(99);
        for n in 0..20 {
            let p = Permutation::random(&mut rng, n);
            let inv = p.inverse();
            for v in 0..n {
                assert_eq!(inv.apply(p.apply(v)), v);
            }
            assert_eq!(p.then(&inv), Permutation::identity(n));
        }
    }

    #[test]
    fn then_composes_left_to_right() {
        let a = Permutation::new([1, 2, 0]).unwrap();
        let b = Permutation::new([0, 2, 1]).unwrap();
        // 0 -> 1 -> 2, 1 -> 2 -> 1, 2 -> 0 -> 0
        assert_eq!(a.then(&b).as_slice(), &[2, 1, 0]);
    }
}
