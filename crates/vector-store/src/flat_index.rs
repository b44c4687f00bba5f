use crate::error::{Result, VectorStoreError};

/// Append-only flat index over fixed-dimension vectors.
///
/// Search is a brute-force linear scan by squared Euclidean distance —
/// O(len × dimension) per query. Callers depend on the exact ranking
/// contract: ascending distance, ties broken by insertion position (earlier
/// position wins), so results are deterministic for identical inputs.
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    /// Rebuild an index from persisted vectors, validating every row.
    pub fn from_vectors(dimension: usize, vectors: Vec<Vec<f32>>) -> Result<Self> {
        for vector in &vectors {
            if vector.len() != dimension {
                return Err(VectorStoreError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
        }
        Ok(Self { dimension, vectors })
    }

    /// Append vectors in order.
    ///
    /// Every vector is validated before anything is appended: a dimension
    /// mismatch anywhere in the batch leaves the index untouched.
    pub fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<()> {
        for vector in &vectors {
            if vector.len() != self.dimension {
                return Err(VectorStoreError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }
        self.vectors.extend(vectors);
        Ok(())
    }

    /// Return the `min(k, len)` stored positions closest to `query`,
    /// ascending by squared Euclidean distance.
    ///
    /// An empty index yields an empty result for any `k`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if self.vectors.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut hits: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, squared_distance(query, vector)))
            .collect();

        hits.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        hits.truncate(k);

        Ok(hits)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_ranks_by_ascending_distance() {
        let mut index = FlatIndex::new(3);
        index
            .add(vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.9, 0.1, 0.0],
            ])
            .unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, 0);
        assert!(results[0].1.abs() < 1e-6);
        assert_eq!(results[1].0, 2);
        assert!(results[0].1 <= results[1].1);
    }

    #[test]
    fn search_caps_k_at_index_size() {
        let mut index = FlatIndex::new(2);
        index.add(vec![vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();

        let results = index.search(&[0.0, 0.0], 10).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn search_on_empty_index_returns_nothing() {
        let index = FlatIndex::new(4);
        assert!(index.search(&[0.0; 4], 0).unwrap().is_empty());
        assert!(index.search(&[0.0; 4], 5).unwrap().is_empty());
    }

    #[test]
    fn equal_distances_break_ties_by_insertion_order() {
        let mut index = FlatIndex::new(2);
        index
            .add(vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]])
            .unwrap();

        let results = index.search(&[0.0, 0.0], 3).unwrap();
        let positions: Vec<usize> = results.iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn add_rejects_wrong_dimension_without_partial_append() {
        let mut index = FlatIndex::new(3);
        let result = index.add(vec![vec![1.0, 0.0, 0.0], vec![1.0, 0.0]]);
        assert!(matches!(
            result,
            Err(VectorStoreError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn search_rejects_wrong_query_dimension() {
        let mut index = FlatIndex::new(3);
        index.add(vec![vec![0.0, 0.0, 0.0]]).unwrap();
        assert!(index.search(&[0.0, 0.0], 1).is_err());
    }

    #[test]
    fn from_vectors_validates_rows() {
        assert!(FlatIndex::from_vectors(2, vec![vec![0.0, 1.0]]).is_ok());
        assert!(FlatIndex::from_vectors(2, vec![vec![0.0]]).is_err());
    }
}
