//! Growable, index-sorted sparse vector.
//!
//! Storage is two parallel buffers, `index` (strictly increasing) and
//! `data`. Only the first `used` slots are live; the physical buffers grow
//! one slot per newly introduced entry and only shrink through
//! [`SparseVector::compact`].
//!
//! Writing a zero over an existing entry keeps the slot. Callers that need
//! the true non-zero pattern from [`SparseVector::index`] must call
//! `compact()` first; [`SparseVector::is_compact`] reports whether that is
//! still necessary.

use crate::error::{KitError, check_dim, check_index};
use num_traits::Float;

#[derive(Clone, Debug, PartialEq)]
pub struct SparseVector<T> {
    size: usize,
    index: Vec<usize>,
    data: Vec<T>,
    used: usize,
}

impl<T: Float> SparseVector<T> {
    /// Empty vector of logical length `size`. Nothing is allocated.
    pub fn new(size: usize) -> Self {
        Self::with_capacity(size, 0)
    }

    /// Empty vector with room for `nz` entries (clamped to `size`).
    pub fn with_capacity(size: usize, nz: usize) -> Self {
        let nz = nz.min(size);
        Self {
            size,
            index: vec![0; nz],
            data: vec![T::zero(); nz],
            used: 0,
        }
    }

    /// Copies the non-zero entries of a dense array.
    pub fn from_dense(x: &[T]) -> Self {
        let nz = x.iter().filter(|v| !v.is_zero()).count();
        let mut v = Self::with_capacity(x.len(), nz);
        for (i, &xi) in x.iter().enumerate().filter(|(_, xi)| !xi.is_zero()) {
            v.index[v.used] = i;
            v.data[v.used] = xi;
            v.used += 1;
        }
        v
    }

    /// Builds a vector from already sorted index/data buffers.
    pub fn from_parts(size: usize, index: Vec<usize>, data: Vec<T>) -> Result<Self, KitError> {
        check_dim(index.len(), data.len())?;
        for (k, &i) in index.iter().enumerate() {
            check_index(i, size)?;
            if k > 0 && index[k - 1] >= i {
                return Err(KitError::InvalidArgument(format!(
                    "indices must be strictly increasing (position {k})"
                )));
            }
        }
        let used = index.len();
        Ok(Self { size, index, data, used })
    }

    /// Logical length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of stored entries, including stored zeros.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Length of the physical buffers.
    pub fn capacity(&self) -> usize {
        self.index.len()
    }

    pub fn get(&self, i: usize) -> Result<T, KitError> {
        check_index(i, self.size)?;
        Ok(match self.find(i) {
            Ok(k) => self.data[k],
            Err(_) => T::zero(),
        })
    }

    pub fn set(&mut self, i: usize, value: T) -> Result<(), KitError> {
        check_index(i, self.size)?;
        let k = self.slot(i);
        self.data[k] = value;
        Ok(())
    }

    pub fn add(&mut self, i: usize, value: T) -> Result<(), KitError> {
        check_index(i, self.size)?;
        let k = self.slot(i);
        self.data[k] = self.data[k] + value;
        Ok(())
    }

    /// Removes stored zeros and trims the buffers to `used`. Idempotent.
    pub fn compact(&mut self) {
        let mut w = 0;
        for r in 0..self.used {
            if !self.data[r].is_zero() {
                self.index[w] = self.index[r];
                self.data[w] = self.data[r];
                w += 1;
            }
        }
        self.used = w;
        self.index.truncate(w);
        self.data.truncate(w);
        self.index.shrink_to_fit();
        self.data.shrink_to_fit();
    }

    /// True when no stored slot holds an explicit zero.
    pub fn is_compact(&self) -> bool {
        self.data[..self.used].iter().all(|v| !v.is_zero())
    }

    /// Indices of the stored entries. Contains stored zeros unless compacted.
    pub fn index(&self) -> &[usize] {
        &self.index[..self.used]
    }

    /// Values of the stored entries. Contains stored zeros unless compacted.
    pub fn data(&self) -> &[T] {
        &self.data[..self.used]
    }

    /// Whole physical index buffer; may be longer than `used()`.
    pub fn raw_index(&self) -> &[usize] {
        &self.index
    }

    /// Whole physical data buffer; may be longer than `used()`.
    pub fn raw_data(&self) -> &[T] {
        &self.data
    }

    /// Mutable view of the stored values (the pattern is fixed).
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data[..self.used]
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.index().iter().copied().zip(self.data().iter().copied())
    }

    /// Drops every entry; buffers are kept.
    pub fn clear(&mut self) {
        self.used = 0;
    }

    pub fn scale(&mut self, alpha: T) {
        for v in self.data_mut() {
            *v = *v * alpha;
        }
    }

    pub fn dot_dense(&self, x: &[T]) -> Result<T, KitError> {
        check_dim(self.size, x.len())?;
        Ok(self.iter().fold(T::zero(), |acc, (i, v)| acc + v * x[i]))
    }

    pub fn norm2(&self) -> T {
        self.data().iter().fold(T::zero(), |acc, &v| acc + v * v).sqrt()
    }

    pub fn to_dense(&self) -> Vec<T> {
        let mut x = vec![T::zero(); self.size];
        for (i, v) in self.iter() {
            x[i] = v;
        }
        x
    }

    fn find(&self, i: usize) -> Result<usize, usize> {
        self.index[..self.used].binary_search(&i)
    }

    /// Position of index `i`, inserting an empty slot if it is absent.
    fn slot(&mut self, i: usize) -> usize {
        match self.find(i) {
            Ok(k) => k,
            Err(k) => {
                if self.used == self.index.len() {
                    self.grow();
                }
                self.index.copy_within(k..self.used, k + 1);
                self.data.copy_within(k..self.used, k + 1);
                self.index[k] = i;
                self.data[k] = T::zero();
                self.used += 1;
                k
            }
        }
    }

    /// Extends the physical buffers by exactly one slot.
    fn grow(&mut self) {
        let new_len = (self.used + 1).min(self.size);
        self.index.resize(new_len, 0);
        self.data.resize(new_len, T::zero());
    }
}
