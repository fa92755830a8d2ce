//! Truth-table gating for controlled ("oracle") operators.
//!
//! An oracle operator applies its base matrix only on basis states whose
//! control lines read as one of the patterns in a [`TruthTable`]; everywhere
//! else it acts as the identity. Since none of the operators here ever change
//! control bits, the check can be made on either the row or the column index of
//! the full-space matrix.
//!
//! Truth-table entries are bit-strings over the control lines, written control
//! line 0 first. Parsing is lenient: empty entries, entries of the
//! wrong length, and entries with characters other than `0`/`1` are dropped
//! (with a warning) rather than rejected, so a table built from garbage simply
//! never activates.

use std::fmt;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use tracing::warn;
use crate::rearrange::BitRearranger;

/// A deduplicated set of activating control patterns.
///
/// Bit `j` of a pattern is the value required on control line `j`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TruthTable {
    width: usize,
    patterns: FxHashSet<usize>,
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries
            = self.patterns.iter()
            .sorted()
            .map(|p| pattern_string(*p, self.width))
            .join(", ");
        write!(f, "{{{}}}", entries)
    }
}

impl TruthTable {
    /// Create an empty table over `width` control lines. An empty table never
    /// activates.
    pub fn empty(width: usize) -> Self {
        Self { width, patterns: FxHashSet::default() }
    }

    /// Table with the single all-ones pattern: the usual "every control set"
    /// condition.
    pub fn all_set(width: usize) -> Self {
        Self::from_patterns(width, [mask(width)])
    }

    /// Parse bit-string entries, ignoring any that are malformed.
    pub fn parse<I, S>(width: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: FxHashSet<usize>
            = entries.into_iter()
            .filter_map(|entry| {
                let entry = entry.as_ref();
                let parsed = parse_entry(width, entry);
                if parsed.is_none() {
                    warn!(entry, width, "ignoring malformed truth-table entry");
                }
                parsed
            })
            .collect();
        Self { width, patterns }
    }

    /// Build from raw patterns; any pattern with bits outside the low `width`
    /// bits is ignored.
    pub fn from_patterns<I>(width: usize, patterns: I) -> Self
    where I: IntoIterator<Item = usize>
    {
        let m = mask(width);
        let patterns: FxHashSet<usize>
            = patterns.into_iter()
            .filter(|p| {
                let ok = *p & !m == 0;
                if !ok {
                    warn!(pattern = *p, width, "ignoring out-of-range truth-table pattern");
                }
                ok
            })
            .collect();
        Self { width, patterns }
    }

    /// Number of control lines the table is written over.
    pub fn width(&self) -> usize { self.width }

    /// Number of distinct activating patterns.
    pub fn len(&self) -> usize { self.patterns.len() }

    pub fn is_empty(&self) -> bool { self.patterns.is_empty() }

    /// Return `true` if `pattern` activates the operator.
    pub fn contains(&self, pattern: usize) -> bool {
        self.patterns.contains(&pattern)
    }

    /// Return `true` if every pattern activates, i.e. the controls are
    /// irrelevant.
    pub fn is_full(&self) -> bool {
        self.width < usize::BITS as usize
            && self.patterns.len() == 1_usize << self.width
    }

    /// Iterate over the activating patterns in no particular order.
    pub fn patterns(&self) -> impl Iterator<Item = usize> + '_ {
        self.patterns.iter().copied()
    }
}

fn mask(width: usize) -> usize {
    if width >= usize::BITS as usize { usize::MAX } else { (1 << width) - 1 }
}

fn parse_entry(width: usize, entry: &str) -> Option<usize> {
    if entry.is_empty() || entry.len() != width { return None; }
    entry.chars()
        .enumerate()
        .try_fold(0_usize, |acc, (j, c)| {
            match c {
                '0' => Some(acc),
                '1' => Some(acc | (1 << j)),
                _ => None,
            }
        })
}

fn pattern_string(pattern: usize, width: usize) -> String {
    (0..width)
        .map(|j| if (pattern >> j) & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// Control lines together with the truth table over them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Controls {
    pub(crate) lines: Vec<usize>,
    pub(crate) table: TruthTable,
}

impl Controls {
    /// Pair control lines with a truth table. Lines are validated by
    /// [`Operator`][crate::operator::Operator] construction, not here.
    ///
    /// A table written over a different number of lines than given here can
    /// never match and is replaced by an empty one.
    pub fn new(lines: Vec<usize>, table: TruthTable) -> Self {
        if table.width() != lines.len() {
            warn!(
                width = table.width(),
                controls = lines.len(),
                "truth table width does not match control count; oracle will never activate"
            );
            let width = lines.len();
            return Self { lines, table: TruthTable::empty(width) };
        }
        Self { lines, table }
    }

    /// Standard control: activate only when every control line is 1.
    pub fn all_set(lines: Vec<usize>) -> Self {
        let table = TruthTable::all_set(lines.len());
        Self { lines, table }
    }

    pub fn lines(&self) -> &[usize] { &self.lines }

    pub fn table(&self) -> &TruthTable { &self.table }

    /// Bind to a register size for fast per-index checks.
    pub fn gate(&self, n: usize) -> ControlGate<'_> {
        ControlGate { rearr: BitRearranger::new(n, &self.lines), table: &self.table }
    }
}

/// [`Controls`] bound to a register size.
#[derive(Clone, Debug)]
pub struct ControlGate<'a> {
    rearr: BitRearranger,
    table: &'a TruthTable,
}

impl<'a> ControlGate<'a> {
    /// Return `true` if the control lines of `global` match the truth table.
    pub fn is_active(&self, global: usize) -> bool {
        !self.table.is_empty()
            && self.table.contains(self.rearr.local_index(global))
    }

    /// Mask of the control lines.
    pub fn mask(&self) -> usize { self.rearr.selected_mask() }
}
