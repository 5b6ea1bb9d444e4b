use itertools::Itertools;

/// Feedback for one cell of a committed guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum CellMark {
    /// Letter sits at this position in the target.
    Exact,
    /// Letter occurs somewhere else in the target.
    Present,
    Absent,
    /// Row not committed yet, or the cell is empty.
    Neutral,
}

/// A filled row handed back to the owning session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCompletion {
    pub generation: u64,
    pub row_index: usize,
    pub values: Vec<char>,
}

impl RowCompletion {
    pub fn guess(&self) -> String {
        self.values.iter().collect()
    }
}

/// Side effects requested by a row transition, applied by the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEffect {
    /// First letter typed into this row while it was active.
    FirstInput,
    /// Move keyboard focus to this column on the next runner step.
    Focus(usize),
    Complete(RowCompletion),
}

/// Strips everything but ASCII letters, uppercases, keeps the first one.
pub fn sanitize(raw: &str) -> Option<char> {
    raw.chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
}

/// Standard per-position classification against the target word.
pub fn classify(target: &str, index: usize, value: char) -> CellMark {
    match target.chars().nth(index) {
        Some(expected) if expected == value => CellMark::Exact,
        _ if target.contains(value) => CellMark::Present,
        _ => CellMark::Absent,
    }
}

/// One guess attempt: a fixed-width row of letter cells.
///
/// Cells fill left to right. `active_column` is the next cell that accepts a
/// letter; cells after it are locked so a guess cannot skip ahead. The row
/// completes either when its last cell receives a letter or when Enter is
/// pressed with every cell filled, and is read-only afterwards.
#[derive(Debug, Clone)]
pub struct GuessRow {
    row_index: usize,
    target: String,
    values: Vec<Option<char>>,
    active_column: usize,
    focus_column: usize,
    is_active: bool,
    is_complete: bool,
    first_input_fired: bool,
    generation: u64,
}

impl GuessRow {
    pub fn new(row_index: usize, target: &str, word_length: usize, generation: u64) -> Self {
        Self {
            row_index,
            target: target.to_ascii_uppercase(),
            values: vec![None; word_length],
            active_column: 0,
            focus_column: 0,
            is_active: false,
            is_complete: false,
            first_input_fired: false,
            generation,
        }
    }

    /// A row rebuilt from an already committed guess.
    pub fn completed(row_index: usize, target: &str, values: &[char], generation: u64) -> Self {
        let mut row = Self::new(row_index, target, values.len(), generation);
        row.record(values);
        row
    }

    pub fn row_index(&self) -> usize {
        self.row_index
    }

    pub fn word_length(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[Option<char>] {
        &self.values
    }

    pub fn active_column(&self) -> usize {
        self.active_column
    }

    pub fn focus_column(&self) -> usize {
        self.focus_column
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_filled(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    pub fn guess(&self) -> String {
        self.values.iter().flatten().join("")
    }

    pub fn is_editable(&self, index: usize) -> bool {
        self.is_active && !self.is_complete && index <= self.active_column && index < self.word_length()
    }

    pub fn activate(&mut self) {
        if self.is_complete {
            return;
        }
        self.is_active = true;
        self.focus_column = 0;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Types `raw` into cell `index`.
    pub fn apply_char(&mut self, index: usize, raw: &str) -> Vec<RowEffect> {
        let Some(letter) = sanitize(raw) else {
            return vec![];
        };
        if !self.is_active || self.is_complete {
            return vec![];
        }

        let mut effects = Vec::new();
        if !self.first_input_fired {
            self.first_input_fired = true;
            effects.push(RowEffect::FirstInput);
        }

        if index != self.active_column || index >= self.word_length() {
            return effects;
        }

        self.values[index] = Some(letter);
        if index + 1 < self.word_length() {
            self.active_column = index + 1;
            effects.push(RowEffect::Focus(index + 1));
        } else {
            effects.push(self.complete());
        }
        effects
    }

    /// Backspace on cell `index`.
    pub fn apply_delete(&mut self, index: usize) -> Vec<RowEffect> {
        if !self.is_editable(index) {
            return vec![];
        }

        if self.values[index].is_some() {
            self.values[index] = None;
            self.active_column = index;
            self.focus_column = index;
            vec![]
        } else if index > 0 {
            let prev = index - 1;
            self.values[prev] = None;
            self.active_column = prev;
            vec![RowEffect::Focus(prev)]
        } else {
            vec![]
        }
    }

    /// Forward delete on cell `index`. An empty cell clears a letter left
    /// behind in the next cell, without unlocking anything past the column.
    pub fn apply_forward_delete(&mut self, index: usize) -> Vec<RowEffect> {
        if !self.is_editable(index) {
            return vec![];
        }

        if self.values[index].is_some() {
            self.values[index] = None;
            self.active_column = index;
            self.focus_column = index;
        } else if let Some(next) = self.values.get_mut(index + 1) {
            *next = None;
        }
        vec![]
    }

    /// Commits the row if every cell holds a letter, wherever the focus is.
    pub fn apply_enter(&mut self) -> Vec<RowEffect> {
        if !self.is_active || self.is_complete || !self.is_filled() {
            return vec![];
        }
        vec![self.complete()]
    }

    /// Applies a scheduled focus transfer; ignored for locked cells.
    pub fn apply_focus(&mut self, column: usize) -> bool {
        if !self.is_editable(column) {
            return false;
        }
        self.focus_column = column;
        true
    }

    pub fn move_focus_left(&mut self) -> bool {
        self.focus_column > 0 && self.apply_focus(self.focus_column - 1)
    }

    pub fn move_focus_right(&mut self) -> bool {
        self.apply_focus(self.focus_column + 1)
    }

    /// Stores a committed guess and freezes the row.
    pub fn record(&mut self, values: &[char]) {
        for (i, cell) in self.values.iter_mut().enumerate() {
            *cell = values.get(i).map(char::to_ascii_uppercase);
        }
        self.is_complete = true;
        self.is_active = false;
        self.active_column = self.word_length().saturating_sub(1);
    }

    pub fn reset(&mut self, target: &str, generation: u64) {
        let len = target.chars().count();
        self.target = target.to_ascii_uppercase();
        self.values = vec![None; len];
        self.active_column = 0;
        self.focus_column = 0;
        self.is_active = false;
        self.is_complete = false;
        self.first_input_fired = false;
        self.generation = generation;
    }

    pub fn marks(&self) -> Vec<CellMark> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, value)| match value {
                Some(letter) if self.is_complete => classify(&self.target, i, *letter),
                _ => CellMark::Neutral,
            })
            .collect()
    }

    fn complete(&mut self) -> RowEffect {
        self.is_complete = true;
        RowEffect::Complete(RowCompletion {
            generation: self.generation,
            row_index: self.row_index,
            values: self.values.iter().flatten().copied().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn active_row(target: &str) -> GuessRow {
        let mut row = GuessRow::new(0, target, target.len(), 1);
        row.activate();
        row
    }

    fn type_word(row: &mut GuessRow, word: &str) -> Vec<RowEffect> {
        word.chars()
            .enumerate()
            .flat_map(|(i, c)| row.apply_char(i, &c.to_string()))
            .collect()
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("a"), Some('A'));
        assert_eq!(sanitize("Q"), Some('Q'));
        assert_eq!(sanitize("1b2"), Some('B'));
        assert_eq!(sanitize("xy"), Some('X'));
        assert_eq!(sanitize("7"), None);
        assert_eq!(sanitize(""), None);
        assert_eq!(sanitize("é"), None);
    }

    #[test]
    fn test_sanitized_value_is_single_uppercase_letter() {
        for raw in ["a", "Z", "!", " ", "3x", "ß", "mno", "\t"] {
            if let Some(c) = sanitize(raw) {
                assert!(c.is_ascii_uppercase(), "{raw:?} produced {c:?}");
            }
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("CRANE", 0, 'R'), CellMark::Present);
        assert_eq!(classify("CRANE", 0, 'C'), CellMark::Exact);
        assert_eq!(classify("CRANE", 3, 'Z'), CellMark::Absent);
    }

    #[test]
    fn test_typing_advances_column_and_requests_focus() {
        let mut row = active_row("CRANE");

        let effects = row.apply_char(0, "c");

        assert_eq!(effects, vec![RowEffect::FirstInput, RowEffect::Focus(1)]);
        assert_eq!(row.values()[0], Some('C'));
        assert_eq!(row.active_column(), 1);
        assert!(!row.is_complete());
    }

    #[test]
    fn test_invalid_char_is_dropped_silently() {
        let mut row = active_row("CRANE");

        assert!(row.apply_char(0, "4").is_empty());
        assert_eq!(row.values()[0], None);
        assert_eq!(row.active_column(), 0);
    }

    #[test]
    fn test_first_input_fires_once_per_row() {
        let mut row = active_row("CRANE");

        let effects = type_word(&mut row, "CR");
        row.apply_delete(2);
        let more = row.apply_char(1, "r");

        let fired = effects
            .iter()
            .chain(more.iter())
            .filter(|e| **e == RowEffect::FirstInput)
            .count();
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_cells_ahead_of_active_column_are_locked() {
        let mut row = active_row("CRANE");

        let effects = row.apply_char(3, "n");

        assert_eq!(effects, vec![RowEffect::FirstInput]);
        assert_eq!(row.values()[3], None);
        assert!(!row.is_editable(3));
        assert!(row.is_editable(0));
    }

    #[test]
    fn test_last_cell_completes_row() {
        let mut row = active_row("CRANE");

        let effects = type_word(&mut row, "CRATE");

        assert!(row.is_complete());
        assert_matches!(
            effects.last(),
            Some(RowEffect::Complete(RowCompletion { row_index: 0, generation: 1, values })) if values == &vec!['C', 'R', 'A', 'T', 'E']
        );
        let completions = effects
            .iter()
            .filter(|e| matches!(e, RowEffect::Complete(_)))
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_complete_row_is_frozen() {
        let mut row = active_row("CRANE");
        type_word(&mut row, "CRATE");

        assert!(row.apply_char(4, "x").is_empty());
        assert!(row.apply_delete(4).is_empty());
        assert!(row.apply_enter().is_empty());
        assert_eq!(row.guess(), "CRATE");
    }

    #[test]
    fn test_enter_requires_all_cells() {
        let mut row = active_row("CRANE");
        type_word(&mut row, "CRA");

        assert!(row.apply_enter().is_empty());
        assert!(!row.is_complete());
    }

    #[test]
    fn test_enter_completes_filled_row_from_any_focus() {
        let mut full = active_row("CRANE");
        type_word(&mut full, "CRAN");
        // typing the last cell would complete on its own
        full.values[4] = Some('E');
        full.apply_focus(1);

        let effects = full.apply_enter();
        assert_matches!(effects.as_slice(), [RowEffect::Complete(c)] if c.guess() == "CRANE");
    }

    #[test]
    fn test_delete_filled_cell_moves_column_back() {
        let mut row = active_row("CRANE");
        type_word(&mut row, "CRA");

        let effects = row.apply_delete(2);

        assert!(effects.is_empty());
        assert_eq!(row.values()[2], None);
        assert_eq!(row.active_column(), 2);

        let effects = row.apply_delete(1);
        assert!(effects.is_empty());
        assert_eq!(row.values()[1], None);
        assert_eq!(row.active_column(), 1);
    }

    #[test]
    fn test_delete_empty_cell_clears_previous() {
        let mut row = active_row("CRANE");
        type_word(&mut row, "CR");

        let effects = row.apply_delete(2);

        assert_eq!(effects, vec![RowEffect::Focus(1)]);
        assert_eq!(row.values()[1], None);
        assert_eq!(row.active_column(), 1);
    }

    #[test]
    fn test_delete_at_start_when_empty_is_noop() {
        let mut row = active_row("CRANE");

        assert!(row.apply_delete(0).is_empty());
        assert_eq!(row.active_column(), 0);
        assert!(row.values().iter().all(Option::is_none));
    }

    #[test]
    fn test_forward_delete() {
        let mut row = active_row("CRANE");
        type_word(&mut row, "CRA");

        row.apply_forward_delete(1);
        assert_eq!(row.values()[1], None);
        assert_eq!(row.active_column(), 1);
        assert_eq!(row.values()[2], Some('A'));

        row.apply_forward_delete(1);
        assert_eq!(row.values()[2], None);
        assert_eq!(row.active_column(), 1);
    }

    #[test]
    fn test_inactive_row_ignores_input() {
        let mut row = GuessRow::new(2, "CRANE", 5, 1);

        assert!(row.apply_char(0, "c").is_empty());
        assert!(!row.is_editable(0));
    }

    #[test]
    fn test_marks_hidden_until_complete() {
        let mut row = active_row("CRANE");
        type_word(&mut row, "RAC");
        assert!(row.marks().iter().all(|m| *m == CellMark::Neutral));

        type_word_from(&mut row, 3, "EZ");
        assert_eq!(
            row.marks(),
            vec![
                CellMark::Present,
                CellMark::Present,
                CellMark::Present,
                CellMark::Present,
                CellMark::Absent
            ]
        );
    }

    fn type_word_from(row: &mut GuessRow, start: usize, word: &str) {
        for (i, c) in word.chars().enumerate() {
            row.apply_char(start + i, &c.to_string());
        }
    }

    #[test]
    fn test_completed_row_from_values() {
        let row = GuessRow::completed(3, "CRANE", &['c', 'r', 'a', 'n', 'e'], 4);

        assert!(row.is_complete());
        assert!(!row.is_active());
        assert_eq!(row.guess(), "CRANE");
        assert!(row.marks().iter().all(|m| *m == CellMark::Exact));
    }

    #[test]
    fn test_reset_clears_latch_and_cells() {
        let mut row = active_row("CRANE");
        type_word(&mut row, "CRATE");

        row.reset("PLANT", 2);
        row.activate();

        assert_eq!(row.generation(), 2);
        assert!(!row.is_complete());
        assert_eq!(row.active_column(), 0);
        assert!(row.values().iter().all(Option::is_none));
        assert_eq!(row.apply_char(0, "p")[0], RowEffect::FirstInput);
    }

    #[test]
    fn test_focus_moves_only_over_editable_cells() {
        let mut row = active_row("CRANE");
        type_word(&mut row, "CR");
        row.apply_focus(2);

        assert!(row.move_focus_left());
        assert_eq!(row.focus_column(), 1);
        assert!(row.move_focus_right());
        assert!(!row.move_focus_right());
        assert_eq!(row.focus_column(), 2);
    }
}
