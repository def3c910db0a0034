// Integration tests (native) for the `count-drill` crate.
// These tests avoid wasm-specific functionality and exercise pure Rust logic so
// they can run under `cargo test` on the host.

use count_drill::{
    DrillSession, FixedTokens, Group, LayoutConfig, LayoutError, LayoutWarning, Lcg, Operator, Outcome,
    QuestionType, RenderSink, Settings, TokenPair, counting_layout_json, layout_for,
};

/// Renders tokens as text, one line per row, `x` marking grayed-out tokens.
#[derive(Default)]
struct TextSink {
    rows: Vec<String>,
    placed: Vec<(usize, usize)>,
}

impl TextSink {
    fn text(&self) -> String {
        self.rows.join("\n")
    }
}

impl RenderSink for TextSink {
    fn clear(&mut self) {
        self.rows.clear();
        self.placed.clear();
    }
    fn place(&mut self, row: u32, _column: u32, group: Group, _token: &str, _style: &str) {
        let row = row as usize;
        while self.rows.len() <= row {
            self.rows.push(String::new());
        }
        self.rows[row].push(match group {
            Group::Primary => 'a',
            Group::Secondary => 'b',
        });
        self.placed.push((row, self.rows[row].len() - 1));
    }
    fn mark_removed(&mut self, index: usize) {
        let (row, col) = self.placed[index];
        self.rows[row].replace_range(col..col + 1, "x");
    }
}

#[test]
fn addition_example_draws_merged_rows() {
    let layout = layout_for(7, 4, '+', &LayoutConfig::default()).unwrap();
    let mut sink = TextSink::default();
    for p in &layout.placements {
        sink.place(p.row, p.column, p.group, "", "");
    }
    assert_eq!(sink.text(), "aaaaa\naabbb\nb");
}

#[test]
fn subtraction_example_grays_trailing_tokens() {
    let layout = layout_for(9, 4, '-', &LayoutConfig::default()).unwrap();
    let mut sink = TextSink::default();
    for p in &layout.placements {
        sink.place(p.row, p.column, p.group, "", "");
    }
    for r in &layout.removals {
        sink.mark_removed(r.index);
    }
    assert_eq!(sink.text(), "aaaaa\nxxxx");
}

#[test]
fn clamped_subtraction_is_a_warning_not_an_error() {
    let layout = layout_for(3, 5, '-', &LayoutConfig::default()).unwrap();
    assert_eq!(layout.operator, Operator::Subtract);
    assert_eq!(layout.removals.len(), 3);
    assert_eq!(layout.warnings, vec![LayoutWarning::ClampedSubtraction { requested: 5, clamped_to: 3 }]);
}

#[test]
fn invalid_inputs_fail_before_any_event() {
    assert_eq!(
        layout_for(2, 2, '%', &LayoutConfig::default()),
        Err(LayoutError::UnsupportedOperator('%'))
    );
    assert!(matches!(
        layout_for(-2, 2, '+', &LayoutConfig::default()),
        Err(LayoutError::InvalidOperand { name: "num1", value: -2 })
    ));
}

#[test]
fn layout_json_export() {
    let json = counting_layout_json(2, 1, '+', 5).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["operator"], "+");
    assert_eq!(value["placements"].as_array().unwrap().len(), 3);
    assert_eq!(value["placements"][2]["group"], "Secondary");
    assert_eq!(value["placements"][2]["column"], 2);
}

#[test]
fn full_round_trip_through_a_session() {
    let settings = Settings { question_type: QuestionType::Addition, ..Settings::default() };
    let pair = TokenPair { primary: "🐼", secondary: "🐨" };
    let mut session = DrillSession::new(settings, Lcg::new(2024), FixedTokens(pair), 0.0).unwrap();
    let mut sink = TextSink::default();

    let problem = *session.problem().unwrap();
    session.show_counting(0.0).unwrap();
    // half way through the first group only some tokens are visible
    session.tick(f64::from(problem.num1().saturating_sub(1)) * 40.0, &mut sink);
    let early = sink.text().chars().filter(|c| *c != '\n').count();
    assert!(early as u32 <= problem.num1());

    session.tick(60_000.0, &mut sink);
    let text = sink.text();
    assert_eq!(text.matches('a').count() as u32, problem.num1());
    assert_eq!(text.matches('b').count() as u32, problem.num2());
    assert!(sink.rows.iter().all(|r| r.chars().count() <= 5));

    let outcome = session.submit(&problem.answer().to_string(), 60_000.0);
    assert_eq!(outcome, Outcome::Correct { streak: 1, streak_reward: false });

    // next round wipes the board
    session.tick(62_000.0, &mut sink);
    assert!(sink.rows.is_empty());
    assert_eq!(session.round_number(), 2);
}
