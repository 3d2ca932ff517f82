//! Voxel densification.
//!
//! Survey values are sampled per voxel: each depth is the midpoint of a voxel
//! of fixed height. Runs of equal values are merged into blocks so a profile
//! column is drawn as a handful of bands instead of one box per voxel.

use serde::Serialize;

use crate::error::{ProfileError, Result};
use crate::model::DepthRange;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block<T> {
    pub height: f64,
    pub value: T,
}

/// Blocks ordered bottom to top, starting at `range.lower`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensifiedStack<T> {
    pub range: DepthRange,
    pub blocks: Vec<Block<T>>,
}

impl<T> DensifiedStack<T> {
    pub fn block_heights(&self) -> impl Iterator<Item = f64> + '_ {
        self.blocks.iter().map(|block| block.height)
    }

    pub fn block_values(&self) -> impl Iterator<Item = &T> + '_ {
        self.blocks.iter().map(|block| &block.value)
    }
}

/// Values that can be merged into blocks. Two values merge when they fall in
/// the same class; missing values (NaN) merge with each other.
pub trait VoxelValue: Clone {
    fn same_class(&self, other: &Self) -> bool;
}

impl VoxelValue for f64 {
    fn same_class(&self, other: &Self) -> bool {
        self == other || (self.is_nan() && other.is_nan())
    }
}

impl VoxelValue for &str {
    fn same_class(&self, other: &Self) -> bool {
        self == other
    }
}

impl VoxelValue for String {
    fn same_class(&self, other: &Self) -> bool {
        self == other
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DensifyInput<'a, T> {
    pub depths: &'a [f64],
    pub values: &'a [T],
    pub voxel_height: f64,
}

pub fn densify<T: VoxelValue>(input: DensifyInput<'_, T>) -> Result<DensifiedStack<T>> {
    let DensifyInput {
        depths,
        values,
        voxel_height,
    } = input;

    if depths.is_empty() || values.is_empty() {
        return Err(ProfileError::EmptySample {
            id: "<densify>".to_string(),
        });
    }
    if depths.len() != values.len() {
        return Err(ProfileError::malformed(
            "<densify>",
            format!("{} depths for {} values", depths.len(), values.len()),
        ));
    }
    if !(voxel_height.is_finite() && voxel_height > 0.0) {
        return Err(ProfileError::InvalidParameter(format!(
            "voxel height must be positive, got {voxel_height}"
        )));
    }
    if depths.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(ProfileError::malformed(
            "<densify>",
            "depths are not strictly ascending",
        ));
    }

    let half = voxel_height / 2.0;
    let lower = depths[0] - half;
    let upper = depths[depths.len() - 1] + half;

    let mut blocks = Vec::new();
    let mut block_start = lower;
    for i in 1..depths.len() {
        if !values[i].same_class(&values[i - 1]) {
            let next_start = depths[i] - half;
            blocks.push(Block {
                height: next_start - block_start,
                value: values[i - 1].clone(),
            });
            block_start = next_start;
        }
    }
    blocks.push(Block {
        height: upper - block_start,
        value: values[values.len() - 1].clone(),
    });

    Ok(DensifiedStack {
        range: DepthRange::new(lower, upper),
        blocks,
    })
}
