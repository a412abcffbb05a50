//! Text block layout: greedy word wrap and vertical placement.

/// Wrapped lines ready to draw, plus the canvas height they need.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    /// Each line keeps the trailing space it was measured with
    pub lines: Vec<String>,
    pub line_height: f64,
    pub canvas_height: u32,
}

impl TextBlock {
    /// Baseline (middle) y of each line, centred in the canvas.
    pub fn line_positions(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        let block = self.line_height * self.lines.len().saturating_sub(1) as f64;
        let top = self.canvas_height as f64 / 2.0 - block / 2.0;
        self.lines
            .iter()
            .enumerate()
            .map(move |(i, line)| (line.as_str(), top + i as f64 * self.line_height))
    }
}

/// Break `text` on single spaces so each line measures at most `max_width`.
///
/// A word wider than `max_width` still gets a line of its own.
pub fn wrap_words<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split(' ') {
        let candidate = format!("{line}{word} ");
        if !line.is_empty() && measure(&candidate) > max_width {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
            line.push(' ');
        } else {
            line = candidate;
        }
    }
    lines.push(line);
    lines
}

/// Canvas height for `line_count` lines, capped by `max_height` when set.
pub fn canvas_height(line_count: usize, line_height: f64, padding: f64, max_height: Option<u32>) -> u32 {
    let height = (line_height * line_count as f64 + padding).max(0.0) as u32;
    match max_height {
        Some(max) if max > 0 => height.min(max),
        _ => height,
    }
}

pub fn layout<F>(
    text: &str,
    max_width: f64,
    line_height: f64,
    padding: f64,
    max_height: Option<u32>,
    measure: F,
) -> TextBlock
where
    F: Fn(&str) -> f64,
{
    let lines = wrap_words(text, max_width, measure);
    let canvas_height = canvas_height(lines.len(), line_height, padding, max_height);
    TextBlock { lines, line_height, canvas_height }
}
