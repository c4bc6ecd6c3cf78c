//! Work partitioning for kernel dispatch.
//!
//! A dispatch is described by a fixed local size and a global item count
//! rounded up to it. wgpu caps the number of workgroups per dimension, so
//! long 1-D launches are folded into a 2-D grid; kernels recover the linear
//! id and discard the overshoot.

use crate::error::{Error, Result};

/// Smallest multiple of `local` that is `>= n`.
pub fn round_up(n: usize, local: usize) -> usize {
    debug_assert!(local > 0);
    n.div_ceil(local) * local
}

/// Number of partial sums the strided reduction writes.
///
/// Never fewer than one workgroup, never more than `cap` rounded up.
pub fn reduction_items(n: usize, local: usize, cap: usize) -> usize {
    round_up(n.min(cap).max(1), local)
}

/// 1-D launch over `items` work items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition1d {
    items: usize,
    local: u32,
    global: usize,
    workgroups: (u32, u32, u32),
}

impl Partition1d {
    /// Partition `items` into groups of `local`, folding the grid when the
    /// workgroup count exceeds `max_per_dim`.
    pub fn new(items: usize, local: u32, max_per_dim: u32) -> Result<Self> {
        if local == 0 || max_per_dim == 0 {
            return Err(Error::config("partition needs a non-zero local size and limit"));
        }

        let global = round_up(items.max(1), local as usize);
        let groups = global / local as usize;
        let max = max_per_dim as usize;

        let (x, y) = if groups <= max {
            (groups, 1)
        } else {
            (max, groups.div_ceil(max))
        };

        if y > max {
            return Err(Error::Capacity {
                what: "workgroups",
                requested: groups as u64,
                limit: (max as u64) * (max as u64),
            });
        }

        let partition = Self {
            items,
            local,
            global,
            workgroups: (x as u32, y as u32, 1),
        };
        log::debug!(
            "partition {} items: local {}, global {}, grid {:?}, launched {}{}",
            partition.items(),
            partition.local(),
            partition.global(),
            partition.workgroups(),
            partition.launched(),
            if partition.is_folded() { " (folded)" } else { "" }
        );
        Ok(partition)
    }

    /// Work items that carry data.
    pub fn items(&self) -> usize {
        self.items
    }

    /// Local (workgroup) size.
    pub fn local(&self) -> u32 {
        self.local
    }

    /// Items rounded up to the local size.
    pub fn global(&self) -> usize {
        self.global
    }

    /// Workgroup grid to dispatch.
    pub fn workgroups(&self) -> (u32, u32, u32) {
        self.workgroups
    }

    /// Whether the grid had to be folded into a second dimension.
    pub fn is_folded(&self) -> bool {
        self.workgroups.1 > 1
    }

    /// Work items actually launched, including the folding overshoot.
    pub fn launched(&self) -> usize {
        let (x, y, z) = self.workgroups;
        x as usize * y as usize * z as usize * self.local as usize
    }
}

/// 2-D launch over a `rows x cols` output with square tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition2d {
    rows: usize,
    cols: usize,
    workgroups: (u32, u32, u32),
}

impl Partition2d {
    pub fn new(rows: usize, cols: usize, tile: u32, max_per_dim: u32) -> Result<Self> {
        if tile == 0 {
            return Err(Error::config("tile size must be > 0"));
        }

        let gx = round_up(cols.max(1), tile as usize) / tile as usize;
        let gy = round_up(rows.max(1), tile as usize) / tile as usize;

        for groups in [gx, gy] {
            if groups > max_per_dim as usize {
                return Err(Error::Capacity {
                    what: "workgroups per dimension",
                    requested: groups as u64,
                    limit: max_per_dim as u64,
                });
            }
        }

        Ok(Self {
            rows,
            cols,
            workgroups: (gx as u32, gy as u32, 1),
        })
    }

    /// Output rows; work items with `y >= rows` are discarded.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Output columns; work items with `x >= cols` are discarded.
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn workgroups(&self) -> (u32, u32, u32) {
        self.workgroups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(0, 128), 0);
        assert_eq!(round_up(1, 128), 128);
        assert_eq!(round_up(128, 128), 128);
        assert_eq!(round_up(129, 128), 256);
        assert_eq!(round_up(1 << 24, 128), 1 << 24);
    }

    #[test]
    fn test_reduction_items() {
        assert_eq!(reduction_items(1 << 24, 128, 1 << 16), 1 << 16);
        assert_eq!(reduction_items(1000, 128, 1 << 16), 1024);
        assert_eq!(reduction_items(0, 128, 1 << 16), 128);
        assert_eq!(reduction_items(5000, 128, 3000), 3072);
    }

    #[test]
    fn test_partition_small_is_flat() {
        let p = Partition1d::new(1000, 128, 65_535).unwrap();
        assert_eq!(p.global(), 1024);
        assert_eq!(p.workgroups(), (8, 1, 1));
        assert!(!p.is_folded());
        assert_eq!(p.launched(), 1024);
    }

    #[test]
    fn test_partition_large_is_folded() {
        let p = Partition1d::new(1 << 24, 128, 65_535).unwrap();
        let (x, y, z) = p.workgroups();
        assert!(p.is_folded());
        assert_eq!((x, y, z), (65_535, 3, 1));
        assert!(p.launched() >= p.global());
        assert_eq!(p.global(), 1 << 24);
    }

    #[test]
    fn test_partition_exceeding_grid_fails() {
        let err = Partition1d::new(10_000, 1, 10).unwrap_err();
        assert!(matches!(err, Error::Capacity { what: "workgroups", .. }));
    }

    #[test]
    fn test_partition_rejects_zero_local() {
        assert!(Partition1d::new(10, 0, 10).is_err());
    }

    #[test]
    fn test_partition_2d() {
        let p = Partition2d::new(100, 100, 16, 65_535).unwrap();
        assert_eq!(p.workgroups(), (7, 7, 1));
        assert_eq!((p.rows(), p.cols()), (100, 100));

        let p = Partition2d::new(64, 32, 16, 65_535).unwrap();
        assert_eq!(p.workgroups(), (2, 4, 1));
    }

    #[test]
    fn test_partition_2d_limit() {
        let err = Partition2d::new(1024, 1024, 16, 32).unwrap_err();
        assert!(matches!(err, Error::Capacity { .. }));
    }
}
