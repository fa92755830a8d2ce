//! Index algebra mapping global register indices to and from the local indices
//! of a small operator's matrix.
//!
//! For an ordered list of lines `[l_0, ..., l_{k-1}]` on an *n*-qubit register,
//! bit `l_i` of a global index becomes bit `i` of the local index. All other
//! ("unselected") bits pass through an operator untouched, so a global index
//! splits cleanly into `(global & unselected) | scatter(local)`.
//!
//! # Example
//! ```
//! use lineq_sim::rearrange::BitRearranger;
//!
//! // lines 2 and 0 of a 3-qubit register, in that order
//! let rearr = BitRearranger::new(3, &[2, 0]);
//! assert_eq!(rearr.selected_mask(), 0b101);
//! assert_eq!(rearr.unselected_mask(), 0b010);
//! // global ∣..1⟩ on line 0 lands on local bit 1
//! assert_eq!(rearr.local_index(0b001), 0b10);
//! assert_eq!(rearr.scatter(0b10), 0b001);
//! ```

/// Gathers bits at selected global positions into a compact local index, and
/// scatters them back.
///
/// Lines are assumed distinct and less than `n`; construction performs no
/// validation of its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitRearranger {
    n: usize,
    lines: Vec<usize>,
    selected: usize,
    unselected: usize,
    // offsets[l] = scatter(l) for every local index l
    offsets: Vec<usize>,
}

impl BitRearranger {
    /// Build the rearranger for `lines` (in caller order) on an `n`-qubit
    /// register.
    pub fn new(n: usize, lines: &[usize]) -> Self {
        let selected: usize
            = lines.iter().fold(0, |acc, &l| acc | (1 << l));
        let unselected: usize = !selected & full_mask(n);
        let offsets: Vec<usize>
            = (0..1_usize << lines.len())
            .map(|local| scatter_bits(lines, local))
            .collect();
        Self { n, lines: lines.to_vec(), selected, unselected, offsets }
    }

    /// Number of register qubits.
    pub fn n(&self) -> usize { self.n }

    /// Selected lines, in caller order.
    pub fn lines(&self) -> &[usize] { &self.lines }

    /// Dimension of the local space, 2^k.
    pub fn local_dim(&self) -> usize { self.offsets.len() }

    /// Bit mask with a 1 at every selected line.
    pub fn selected_mask(&self) -> usize { self.selected }

    /// Complement of [`Self::selected_mask`] over the low `n` bits.
    pub fn unselected_mask(&self) -> usize { self.unselected }

    /// Gather the selected bits of `global` into a local index.
    pub fn local_index(&self, global: usize) -> usize {
        self.lines.iter()
            .enumerate()
            .fold(0, |acc, (i, &l)| acc | (((global >> l) & 1) << i))
    }

    /// Inverse of [`Self::local_index`]: place the bits of `local` at their
    /// global positions, all unselected bits zero.
    ///
    /// *Panics if `local` is not less than [`Self::local_dim`].*
    pub fn scatter(&self, local: usize) -> usize { self.offsets[local] }

    /// Replace the selected bits of `global` with those scattered from
    /// `local`.
    pub fn merge(&self, global: usize, local: usize) -> usize {
        (global & self.unselected) | self.offsets[local]
    }

    /// Return `true` if `a` and `b` agree on every unselected bit.
    pub fn same_unselected(&self, a: usize, b: usize) -> bool {
        (a ^ b) & self.unselected == 0
    }

    /// Iterate over all global indices sharing the unselected bits of
    /// `global`, in local-index order.
    pub fn siblings(&self, global: usize)
        -> impl Iterator<Item = usize> + '_
    {
        let base = global & self.unselected;
        self.offsets.iter().map(move |off| base | off)
    }
}

fn full_mask(n: usize) -> usize {
    if n >= usize::BITS as usize { usize::MAX } else { (1 << n) - 1 }
}

fn scatter_bits(lines: &[usize], local: usize) -> usize {
    lines.iter()
        .enumerate()
        .fold(0, |acc, (i, &l)| acc | (((local >> i) & 1) << l))
}
