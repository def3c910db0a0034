//! Counting layout engine.
//!
//! Turns an arithmetic problem into a flat list of placement events that a
//! renderer can replay to draw emoji counters in fixed-width rows. Addition
//! tucks the second addend into the free columns of the first group's last row
//! before wrapping; subtraction lays out the minuend and then grays out the
//! trailing tokens. Delays are plain data so the caller picks the clock
//! (animation frames, timers, or an immediate synchronous draw).
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

// --- Configuration -----------------------------------------------------------

pub const DEFAULT_ITEMS_PER_ROW: u32 = 5;
pub const DEFAULT_STEP_MS: u32 = 80;
pub const DEFAULT_GROUP_GAP_MS: u32 = 300;
pub const DEFAULT_REMOVAL_STAGGER_MS: u32 = 100;

/// Row width and reveal timing used by both layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub items_per_row: u32,
    /// Delay between consecutive tokens of one group.
    pub step_ms: u32,
    /// Pause after the first group before the second group (or removals) start.
    pub group_gap_ms: u32,
    /// Delay between consecutive gray-outs in a subtraction.
    pub removal_stagger_ms: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            items_per_row: DEFAULT_ITEMS_PER_ROW,
            step_ms: DEFAULT_STEP_MS,
            group_gap_ms: DEFAULT_GROUP_GAP_MS,
            removal_stagger_ms: DEFAULT_REMOVAL_STAGGER_MS,
        }
    }
}

impl LayoutConfig {
    fn row_width(&self) -> Result<u32, LayoutError> {
        if self.items_per_row == 0 {
            return Err(LayoutError::InvalidRowWidth);
        }
        Ok(self.items_per_row)
    }

    /// Logical time at which the first group has fully appeared plus the gap.
    fn group_start_ms(&self, num1: u32) -> u64 {
        u64::from(num1) * u64::from(self.step_ms) + u64::from(self.group_gap_ms)
    }
}

// --- Errors / warnings -------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("unsupported operator '{0}', expected '+' or '-'")]
    UnsupportedOperator(char),
    #[error("operand {name} must be a non-negative count, got {value}")]
    InvalidOperand { name: &'static str, value: i64 },
    #[error("items per row must be at least 1")]
    InvalidRowWidth,
}

/// Non-fatal corrections applied while computing a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayoutWarning {
    /// The subtrahend exceeded the minuend and was reduced to it.
    ClampedSubtraction { requested: u32, clamped_to: u32 },
}

// --- Operator ----------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
        }
    }
}

impl TryFrom<char> for Operator {
    type Error = LayoutError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '+' => Ok(Operator::Add),
            '-' => Ok(Operator::Subtract),
            other => Err(LayoutError::UnsupportedOperator(other)),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// --- Events ------------------------------------------------------------------

/// Which operand a token visualises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Group {
    Primary,
    Secondary,
}

/// Append one token of `group` at (`row`, `column`) once `reveal_delay_ms` has elapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PlacementEvent {
    pub row: u32,
    pub column: u32,
    pub group: Group,
    pub reveal_delay_ms: u64,
}

/// Gray out the token placed at `index` (placement order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RemovalEvent {
    pub index: usize,
    pub row: u32,
    pub column: u32,
    pub reveal_delay_ms: u64,
}

/// Full result for one problem. Computed once, consumed by a renderer, discarded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub operator: Operator,
    pub placements: Vec<PlacementEvent>,
    pub removals: Vec<RemovalEvent>,
    pub warnings: Vec<LayoutWarning>,
}

impl Layout {
    /// Rows are implied by the highest row any placement references.
    pub fn row_count(&self) -> u32 {
        self.placements.iter().map(|p| p.row + 1).max().unwrap_or(0)
    }

    pub fn count(&self, group: Group) -> usize {
        self.placements.iter().filter(|p| p.group == group).count()
    }

    /// Delay after which every event of this layout has been revealed.
    pub fn total_duration_ms(&self) -> u64 {
        let placed = self.placements.iter().map(|p| p.reveal_delay_ms);
        let removed = self.removals.iter().map(|r| r.reveal_delay_ms);
        placed.chain(removed).max().unwrap_or(0)
    }
}

// --- Algorithms --------------------------------------------------------------

fn operand(name: &'static str, value: i64) -> Result<u32, LayoutError> {
    u32::try_from(value).map_err(|_| LayoutError::InvalidOperand { name, value })
}

fn place_primary(out: &mut Vec<PlacementEvent>, num1: u32, width: u32, step_ms: u32) {
    for i in 0..num1 {
        out.push(PlacementEvent {
            row: i / width,
            column: i % width,
            group: Group::Primary,
            reveal_delay_ms: u64::from(i) * u64::from(step_ms),
        });
    }
}

/// Lay out `num1 + num2` with the second group merged into the first group's last row.
pub fn layout_addition(num1: i64, num2: i64, config: &LayoutConfig) -> Result<Layout, LayoutError> {
    let width = config.row_width()?;
    let num1 = operand("num1", num1)?;
    let num2 = operand("num2", num2)?;

    let mut placements = Vec::with_capacity(num1 as usize + num2 as usize);
    place_primary(&mut placements, num1, width, config.step_ms);

    let used = num1 % width;
    let remainder = if used == 0 { 0 } else { width - used };
    let fill_count = num2.min(remainder);
    let overflow = num2 - fill_count;

    // Cursor sits right after the last primary token (a fresh row when that row is full).
    let mut row = num1 / width;
    let mut column = used;
    let start = config.group_start_ms(num1);
    let step = u64::from(config.step_ms);

    for i in 0..fill_count {
        placements.push(PlacementEvent {
            row,
            column,
            group: Group::Secondary,
            reveal_delay_ms: start + u64::from(i) * step,
        });
        column += 1;
    }
    for j in 0..overflow {
        if column >= width {
            row += 1;
            column = 0;
        }
        placements.push(PlacementEvent {
            row,
            column,
            group: Group::Secondary,
            reveal_delay_ms: start + u64::from(fill_count + j) * step,
        });
        column += 1;
    }

    debug!(num1, num2, remainder, fill_count, overflow, "addition layout");
    Ok(Layout {
        operator: Operator::Add,
        placements,
        removals: Vec::new(),
        warnings: Vec::new(),
    })
}

/// Lay out the minuend and gray out its last `num2` tokens in placement order.
pub fn layout_subtraction(num1: i64, num2: i64, config: &LayoutConfig) -> Result<Layout, LayoutError> {
    let width = config.row_width()?;
    let num1 = operand("num1", num1)?;
    let requested = operand("num2", num2)?;

    let mut warnings = Vec::new();
    let removed = if requested > num1 {
        warn!(num1, num2 = requested, "subtrahend exceeds minuend, clamping");
        warnings.push(LayoutWarning::ClampedSubtraction { requested, clamped_to: num1 });
        num1
    } else {
        requested
    };

    let mut placements = Vec::with_capacity(num1 as usize);
    place_primary(&mut placements, num1, width, config.step_ms);

    let start = config.group_start_ms(num1);
    let first = num1 - removed;
    let removals = (0..removed)
        .map(|k| {
            let index = first + k;
            RemovalEvent {
                index: index as usize,
                row: index / width,
                column: index % width,
                reveal_delay_ms: start + u64::from(k) * u64::from(config.removal_stagger_ms),
            }
        })
        .collect();

    debug!(num1, removed, "subtraction layout");
    Ok(Layout {
        operator: Operator::Subtract,
        placements,
        removals,
        warnings,
    })
}

/// Dispatch on an already parsed operator.
pub fn lay_out(operator: Operator, num1: i64, num2: i64, config: &LayoutConfig) -> Result<Layout, LayoutError> {
    match operator {
        Operator::Add => layout_addition(num1, num2, config),
        Operator::Subtract => layout_subtraction(num1, num2, config),
    }
}

/// Dispatch on a raw operator character, rejecting anything but `+` / `-`.
pub fn layout_for(num1: i64, num2: i64, operator: char, config: &LayoutConfig) -> Result<Layout, LayoutError> {
    lay_out(Operator::try_from(operator)?, num1, num2, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn cells(layout: &Layout, group: Group) -> Vec<(u32, u32)> {
        layout
            .placements
            .iter()
            .filter(|p| p.group == group)
            .map(|p| (p.row, p.column))
            .collect()
    }

    #[test]
    fn addition_merges_into_last_primary_row() {
        let layout = layout_addition(7, 4, &LayoutConfig::default()).unwrap();
        assert_eq!(
            cells(&layout, Group::Primary),
            vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4), (1, 0), (1, 1)]
        );
        assert_eq!(cells(&layout, Group::Secondary), vec![(1, 2), (1, 3), (1, 4), (2, 0)]);
        assert_eq!(layout.row_count(), 3);
        assert!(layout.removals.is_empty());
        assert!(layout.warnings.is_empty());
    }

    #[test]
    fn addition_delays_follow_group_offsets() {
        let layout = layout_addition(7, 4, &LayoutConfig::default()).unwrap();
        let delays: Vec<u64> = layout.placements.iter().map(|p| p.reveal_delay_ms).collect();
        // primary 0..480 step 80, secondary starts at 7*80 + 300 = 860
        assert_eq!(delays, vec![0, 80, 160, 240, 320, 400, 480, 860, 940, 1020, 1100]);
    }

    #[test]
    fn addition_with_full_last_row_starts_new_row() {
        let layout = layout_addition(10, 3, &LayoutConfig::default()).unwrap();
        assert_eq!(cells(&layout, Group::Secondary), vec![(2, 0), (2, 1), (2, 2)]);
    }

    #[test]
    fn addition_with_zero_first_operand_starts_at_origin() {
        let layout = layout_addition(0, 6, &LayoutConfig::default()).unwrap();
        assert_eq!(
            cells(&layout, Group::Secondary),
            vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4), (1, 0)]
        );
        assert_eq!(layout.placements[0].reveal_delay_ms, 300);
    }

    #[test]
    fn addition_second_group_smaller_than_remainder() {
        let layout = layout_addition(3, 1, &LayoutConfig::default()).unwrap();
        assert_eq!(cells(&layout, Group::Secondary), vec![(0, 3)]);
        assert_eq!(layout.row_count(), 1);
    }

    #[test]
    fn addition_counts_and_bounds_hold_up_to_one_hundred() {
        let config = LayoutConfig::default();
        for num1 in 0..=100i64 {
            for num2 in 0..=(100 - num1) {
                let layout = layout_addition(num1, num2, &config).unwrap();
                assert_eq!(layout.placements.len() as i64, num1 + num2);
                assert_eq!(layout.count(Group::Primary) as i64, num1);
                assert_eq!(layout.count(Group::Secondary) as i64, num2);

                let mut rows_seen = vec![false; layout.row_count() as usize];
                for p in &layout.placements {
                    assert!(p.column < config.items_per_row);
                    rows_seen[p.row as usize] = true;
                }
                assert!(rows_seen.iter().all(|&seen| seen), "gap in rows for {num1}+{num2}");

                for group in [Group::Primary, Group::Secondary] {
                    let delays: Vec<u64> = layout
                        .placements
                        .iter()
                        .filter(|p| p.group == group)
                        .map(|p| p.reveal_delay_ms)
                        .collect();
                    assert!(delays.windows(2).all(|w| w[0] <= w[1]));
                }
            }
        }
    }

    #[test]
    fn addition_never_shares_a_cell() {
        let layout = layout_addition(13, 9, &LayoutConfig::default()).unwrap();
        let mut all: Vec<(u32, u32)> = layout.placements.iter().map(|p| (p.row, p.column)).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 22);
    }

    #[test]
    fn subtraction_grays_out_trailing_tokens() {
        let layout = layout_subtraction(9, 4, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.placements.len(), 9);
        assert_eq!(layout.count(Group::Secondary), 0);
        assert_eq!(layout.row_count(), 2);
        let indices: Vec<usize> = layout.removals.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![5, 6, 7, 8]);
        let delays: Vec<u64> = layout.removals.iter().map(|r| r.reveal_delay_ms).collect();
        // 9*80 + 300 = 1020, then 100ms apart
        assert_eq!(delays, vec![1020, 1120, 1220, 1320]);
        assert_eq!((layout.removals[0].row, layout.removals[0].column), (1, 0));
        assert!(layout.warnings.is_empty());
    }

    #[test]
    fn subtraction_clamps_oversized_subtrahend() {
        let layout = layout_subtraction(3, 5, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.placements.len(), 3);
        assert_eq!(layout.removals.len(), 3);
        assert_eq!(
            layout.warnings,
            vec![LayoutWarning::ClampedSubtraction { requested: 5, clamped_to: 3 }]
        );
    }

    #[test]
    fn subtraction_of_zero_removes_nothing() {
        let layout = layout_subtraction(4, 0, &LayoutConfig::default()).unwrap();
        assert!(layout.removals.is_empty());
        assert_eq!(layout.total_duration_ms(), 240);
    }

    #[rstest]
    #[case(-1, 2, "num1")]
    #[case(3, -4, "num2")]
    fn negative_operands_are_rejected(#[case] num1: i64, #[case] num2: i64, #[case] name: &str) {
        for op in ['+', '-'] {
            let err = layout_for(num1, num2, op, &LayoutConfig::default()).unwrap_err();
            assert!(matches!(err, LayoutError::InvalidOperand { name: n, .. } if n == name));
        }
    }

    #[rstest]
    #[case('*')]
    #[case('/')]
    #[case('x')]
    fn unknown_operator_is_rejected(#[case] op: char) {
        let err = layout_for(1, 1, op, &LayoutConfig::default()).unwrap_err();
        assert_eq!(err, LayoutError::UnsupportedOperator(op));
    }

    #[test]
    fn zero_width_rows_are_rejected() {
        let config = LayoutConfig { items_per_row: 0, ..LayoutConfig::default() };
        assert_eq!(layout_addition(1, 1, &config), Err(LayoutError::InvalidRowWidth));
    }

    #[test]
    fn custom_row_width_and_timing() {
        let config = LayoutConfig { items_per_row: 3, step_ms: 10, group_gap_ms: 5, removal_stagger_ms: 1 };
        let layout = layout_addition(4, 3, &config).unwrap();
        assert_eq!(cells(&layout, Group::Secondary), vec![(1, 1), (1, 2), (2, 0)]);
        assert_eq!(layout.placements[4].reveal_delay_ms, 45);
    }

    #[test]
    fn layout_is_pure() {
        let config = LayoutConfig::default();
        assert_eq!(layout_for(12, 7, '+', &config), layout_for(12, 7, '+', &config));
        assert_eq!(layout_for(12, 7, '-', &config), layout_for(12, 7, '-', &config));
    }
}
