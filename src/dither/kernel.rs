//! Error diffusion kernel definitions.
//!
//! Every kernel fits a footprint of two cells to the right on the current row
//! and three cells left to two cells right on each of the next two rows. The
//! error buffer margin is sized from that reach.

use std::fmt;
use std::str::FromStr;

use crate::error::SprError;

/// Cells of padding kept around the error buffer on every side.
pub const MARGIN: usize = 3;

/// Weight table for one diffusion kernel.
///
/// Each neighbour at offset `(dx, dy)` receives `error * weight / divisor`.
#[derive(Debug, Clone, Copy)]
pub struct KernelWeights {
    pub entries: &'static [(i32, i32, u8)],
    pub divisor: u8,
}

/// ```text
///        X   7
///    3   5   1
/// ```
const FLOYD_STEINBERG: KernelWeights = KernelWeights {
    entries: &[(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)],
    divisor: 16,
};

/// ```text
///            X   7   5
///    3   5   7   5   3
///    1   3   5   3   1
/// ```
const JARVIS_JUDICE_NINKE: KernelWeights = KernelWeights {
    entries: &[
        (1, 0, 7),
        (2, 0, 5),
        (-2, 1, 3),
        (-1, 1, 5),
        (0, 1, 7),
        (1, 1, 5),
        (2, 1, 3),
        (-2, 2, 1),
        (-1, 2, 3),
        (0, 2, 5),
        (1, 2, 3),
        (2, 2, 1),
    ],
    divisor: 48,
};

const STUCKI: KernelWeights = KernelWeights {
    entries: &[
        (1, 0, 8),
        (2, 0, 4),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 8),
        (1, 1, 4),
        (2, 1, 2),
        (-2, 2, 1),
        (-1, 2, 2),
        (0, 2, 4),
        (1, 2, 2),
        (2, 2, 1),
    ],
    divisor: 42,
};

const BURKES: KernelWeights = KernelWeights {
    entries: &[
        (1, 0, 8),
        (2, 0, 4),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 8),
        (1, 1, 4),
        (2, 1, 2),
    ],
    divisor: 32,
};

/// ```text
///            X   7
///    1   3   5
/// ```
const FAN: KernelWeights = KernelWeights {
    entries: &[(1, 0, 7), (-2, 1, 1), (-1, 1, 3), (0, 1, 5)],
    divisor: 16,
};

const SIERRA3: KernelWeights = KernelWeights {
    entries: &[
        (1, 0, 5),
        (2, 0, 3),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 5),
        (1, 1, 4),
        (2, 1, 2),
        (-1, 2, 2),
        (0, 2, 3),
        (1, 2, 2),
    ],
    divisor: 32,
};

const SIERRA2: KernelWeights = KernelWeights {
    entries: &[
        (1, 0, 4),
        (2, 0, 3),
        (-2, 1, 1),
        (-1, 1, 2),
        (0, 1, 3),
        (1, 1, 2),
        (2, 1, 1),
    ],
    divisor: 16,
};

const SIERRA_2_4A: KernelWeights = KernelWeights {
    entries: &[(1, 0, 2), (-1, 1, 1), (0, 1, 1)],
    divisor: 4,
};

/// Propagates 6/8 of the error.
///
/// ```text
///        X   1   1
///    1   1   1
///        1
/// ```
const ATKINSON: KernelWeights = KernelWeights {
    entries: &[(1, 0, 1), (2, 0, 1), (-1, 1, 1), (0, 1, 1), (1, 1, 1), (0, 2, 1)],
    divisor: 8,
};

const SHIAU_FAN_4: KernelWeights = KernelWeights {
    entries: &[(1, 0, 4), (-2, 1, 1), (-1, 1, 1), (0, 1, 2)],
    divisor: 8,
};

/// ```text
///                X   8
///    1   1   2   4
/// ```
const SHIAU_FAN_5: KernelWeights = KernelWeights {
    entries: &[(1, 0, 8), (-3, 1, 1), (-2, 1, 1), (-1, 1, 2), (0, 1, 4)],
    divisor: 16,
};

/// The diffusion matrices, in id order 0..=10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffusionKernel {
    #[default]
    FloydSteinberg,
    JarvisJudiceNinke,
    Stucki,
    Burkes,
    Fan,
    Sierra3,
    Sierra2,
    Sierra24A,
    Atkinson,
    ShiauFan4,
    ShiauFan5,
}

impl DiffusionKernel {
    pub const ALL: [DiffusionKernel; 11] = [
        DiffusionKernel::FloydSteinberg,
        DiffusionKernel::JarvisJudiceNinke,
        DiffusionKernel::Stucki,
        DiffusionKernel::Burkes,
        DiffusionKernel::Fan,
        DiffusionKernel::Sierra3,
        DiffusionKernel::Sierra2,
        DiffusionKernel::Sierra24A,
        DiffusionKernel::Atkinson,
        DiffusionKernel::ShiauFan4,
        DiffusionKernel::ShiauFan5,
    ];

    /// Numeric kernel id.
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn weights(self) -> KernelWeights {
        match self {
            DiffusionKernel::FloydSteinberg => FLOYD_STEINBERG,
            DiffusionKernel::JarvisJudiceNinke => JARVIS_JUDICE_NINKE,
            DiffusionKernel::Stucki => STUCKI,
            DiffusionKernel::Burkes => BURKES,
            DiffusionKernel::Fan => FAN,
            DiffusionKernel::Sierra3 => SIERRA3,
            DiffusionKernel::Sierra2 => SIERRA2,
            DiffusionKernel::Sierra24A => SIERRA_2_4A,
            DiffusionKernel::Atkinson => ATKINSON,
            DiffusionKernel::ShiauFan4 => SHIAU_FAN_4,
            DiffusionKernel::ShiauFan5 => SHIAU_FAN_5,
        }
    }

    /// Short name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            DiffusionKernel::FloydSteinberg => "FldStnbrg",
            DiffusionKernel::JarvisJudiceNinke => "JrvJdcNnk",
            DiffusionKernel::Stucki => "Stucki",
            DiffusionKernel::Burkes => "Burkes",
            DiffusionKernel::Fan => "Fan",
            DiffusionKernel::Sierra3 => "Sierra3",
            DiffusionKernel::Sierra2 => "Sierra2",
            DiffusionKernel::Sierra24A => "Sierra24A",
            DiffusionKernel::Atkinson => "Atkinson",
            DiffusionKernel::ShiauFan4 => "ShiauFan4",
            DiffusionKernel::ShiauFan5 => "ShiauFan5",
        }
    }
}

impl FromStr for DiffusionKernel {
    type Err = SprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SprError::BadFormat {
                message: format!("Unknown diffusion algorithm: {}", s),
                help: Some(format!(
                    "Use one of: {}",
                    Self::ALL.map(|k| k.name()).join(", ")
                )),
            })
    }
}

impl fmt::Display for DiffusionKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_divisor() {
        for kernel in DiffusionKernel::ALL {
            let weights = kernel.weights();
            let sum: u32 = weights.entries.iter().map(|&(_, _, w)| w as u32).sum();
            if kernel == DiffusionKernel::Atkinson {
                assert_eq!(sum, 6);
            } else {
                assert_eq!(sum, weights.divisor as u32, "{}", kernel);
            }
        }
    }

    #[test]
    fn test_footprint_within_margin() {
        for kernel in DiffusionKernel::ALL {
            for &(dx, dy, _) in kernel.weights().entries {
                assert!((0..=2).contains(&dy));
                assert!((-(MARGIN as i32)..=2).contains(&dx));
                // Only cells not yet visited
                if dy == 0 {
                    assert!(dx > 0);
                }
            }
        }
    }

    #[test]
    fn test_footprint_sizes() {
        assert_eq!(DiffusionKernel::FloydSteinberg.weights().entries.len(), 4);
        assert_eq!(DiffusionKernel::JarvisJudiceNinke.weights().entries.len(), 12);
        assert_eq!(DiffusionKernel::ShiauFan5.weights().entries.len(), 5);
    }

    #[test]
    fn test_parse_names_case_insensitive() {
        assert_eq!("fldstnbrg".parse::<DiffusionKernel>().unwrap(), DiffusionKernel::FloydSteinberg);
        assert_eq!("SIERRA24A".parse::<DiffusionKernel>().unwrap(), DiffusionKernel::Sierra24A);
        assert!("bayer".parse::<DiffusionKernel>().is_err());
    }

    #[test]
    fn test_ids_round_trip() {
        for (i, kernel) in DiffusionKernel::ALL.iter().enumerate() {
            assert_eq!(kernel.id() as usize, i);
            assert_eq!(DiffusionKernel::from_id(i as u8), Some(*kernel));
        }
        assert_eq!(DiffusionKernel::from_id(11), None);
    }
}
