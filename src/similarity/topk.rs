//! Bounded top-k selection

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A scored vocabulary index
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    pub score: f32,
    pub index: usize,
}

impl Candidate {
    pub fn new(score: f32, index: usize) -> Self {
        // fold -0.0 into 0.0 and every NaN into one NaN so equal scores tie
        let score = if score == 0.0 {
            0.0
        } else if score.is_nan() {
            f32::NAN
        } else {
            score
        };
        Self { score, index }
    }
}

// Greater means ranked earlier: any number before NaN, higher score, then lower index.
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .is_nan()
            .cmp(&self.score.is_nan())
            .then_with(|| self.score.total_cmp(&other.score))
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Keeps the `k` best candidates seen so far
pub(crate) struct TopK {
    k: usize,
    heap: BinaryHeap<Reverse<Candidate>>,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k.saturating_add(1).min(4096)),
        }
    }

    #[inline]
    pub fn push(&mut self, candidate: Candidate) {
        if self.k == 0 {
            return;
        }
        if self.heap.len() < self.k {
            self.heap.push(Reverse(candidate));
        } else if let Some(Reverse(worst)) = self.heap.peek() {
            if candidate > *worst {
                self.heap.pop();
                self.heap.push(Reverse(candidate));
            }
        }
    }

    pub fn merge(&mut self, other: TopK) {
        for Reverse(candidate) in other.heap {
            self.push(candidate);
        }
    }

    /// Best first
    pub fn into_sorted(self) -> Vec<Candidate> {
        let mut out: Vec<Candidate> = self.heap.into_iter().map(|Reverse(c)| c).collect();
        out.sort_unstable_by(|a, b| b.cmp(a));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_best() {
        let mut top = TopK::new(2);
        for (i, s) in [0.1, 0.9, 0.5, 0.7].into_iter().enumerate() {
            top.push(Candidate::new(s, i));
        }
        let out: Vec<usize> = top.into_sorted().iter().map(|c| c.index).collect();
        assert_eq!(out, vec![1, 3]);
    }

    #[test]
    fn test_ties_prefer_lower_index() {
        let mut top = TopK::new(2);
        for i in [4, 2, 9, 0] {
            top.push(Candidate::new(0.5, i));
        }
        let out: Vec<usize> = top.into_sorted().iter().map(|c| c.index).collect();
        assert_eq!(out, vec![0, 2]);
    }

    #[test]
    fn test_negative_zero_ties_with_zero() {
        let mut top = TopK::new(1);
        top.push(Candidate::new(0.0, 3));
        top.push(Candidate::new(-0.0, 1));
        assert_eq!(top.into_sorted()[0].index, 1);
    }

    #[test]
    fn test_nan_ranks_last() {
        let mut top = TopK::new(4);
        top.push(Candidate::new(f32::NAN, 0));
        top.push(Candidate::new(-1.0, 3));
        top.push(Candidate::new(-f32::NAN, 1));
        top.push(Candidate::new(0.5, 2));
        let out: Vec<usize> = top.into_sorted().iter().map(|c| c.index).collect();
        assert_eq!(out, vec![2, 3, 0, 1]);

        let mut top = TopK::new(1);
        top.push(Candidate::new(f32::NAN, 0));
        top.push(Candidate::new(-1.0, 1));
        assert_eq!(top.into_sorted()[0].index, 1);
    }

    #[test]
    fn test_merge() {
        let mut a = TopK::new(3);
        let mut b = TopK::new(3);
        a.push(Candidate::new(0.2, 0));
        a.push(Candidate::new(0.8, 1));
        b.push(Candidate::new(0.9, 5));
        b.push(Candidate::new(0.1, 6));
        a.merge(b);
        let out: Vec<usize> = a.into_sorted().iter().map(|c| c.index).collect();
        assert_eq!(out, vec![5, 1, 0]);
    }

    #[test]
    fn test_zero_k() {
        let mut top = TopK::new(0);
        top.push(Candidate::new(1.0, 0));
        assert!(top.into_sorted().is_empty());
    }
}
