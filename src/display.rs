use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use itertools::Itertools;

use crate::cards::Card;
use crate::chart::{
    BoxGeometry, Geometry, HistogramGeometry, LineGeometry, Margins, ReferenceLine, Viewport,
};
use crate::reconcile::Highlight;
use crate::rules::{RULES_INTRO, RULES_NOTES, RULES_TITLE, RULE_SECTIONS};
use crate::session::{Feedback, StatRow, Tone};

/// Character-cell viewport used for charts in the terminal.
pub fn terminal_viewport() -> Viewport {
    Viewport {
        width: 48.0,
        height: 12.0,
        margins: Margins {
            top: 0.0,
            right: 1.0,
            bottom: 1.0,
            left: 1.0,
        },
        box_width: 12.0,
    }
}

pub fn card_display(card: &Card) -> String {
    let text = card.pretty();
    if card.suit.is_red() {
        text.red().to_string()
    } else {
        text.white().to_string()
    }
}

/// Numbered deal row; selected cards are bracketed.
pub fn deal_row(cards: &[Card], selected: &[Card]) -> String {
    cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            if selected.contains(card) {
                format!("{}:[{}]", i + 1, card_display(card).bold())
            } else {
                format!("{}: {} ", i + 1, card_display(card))
            }
        })
        .join("  ")
}

pub fn board_display(cards: &[Card]) -> String {
    cards.iter().map(card_display).join(" ")
}

/// Best-keep row: cards the player already holds in green, substitutions in red.
pub fn highlighted_row(cards: &[Card], highlights: &[Highlight]) -> String {
    cards
        .iter()
        .zip(highlights)
        .map(|(card, h)| match h {
            Highlight::Match => format!("{}", card.pretty().green().bold()),
            Highlight::NoMatch => format!("{}", card.pretty().red().strikethrough()),
        })
        .join(" ")
}

pub fn feedback_badge(feedback: &Feedback) -> String {
    let message = feedback.message();
    if feedback.is_success() {
        format!("\u{2713} {}", message).green().bold().to_string()
    } else {
        format!("\u{2139} {}", message).bold().to_string()
    }
}

pub fn stats_table(rows: &[StatRow]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Stat".bold().to_string()),
        Cell::new("Value").set_alignment(CellAlignment::Right),
        Cell::new(""),
    ]);
    for row in rows {
        let value = match row.tone {
            Tone::Highlight => row.value.cyan().bold().to_string(),
            Tone::Positive => row.value.green().to_string(),
            Tone::Negative => row.value.dimmed().to_string(),
            Tone::Plain => row.value.bold().to_string(),
        };
        table.add_row(vec![
            Cell::new(row.label.to_uppercase()),
            Cell::new(value).set_alignment(CellAlignment::Right),
            Cell::new(row.description.dimmed().to_string()),
        ]);
    }
    table.to_string()
}

// ---------------------------------------------------------------------------
// Chart rasterizer
// ---------------------------------------------------------------------------

const BAR: char = '\u{2588}';
const MEDIAN: char = '\u{2592}';
const POINT: char = '\u{2022}';
const OUTLIER: char = '\u{25cb}';
const WHISKER: char = '\u{2502}';
const CAP: char = '\u{2500}';
const DASH_H: char = '\u{2504}';
const DASH_V: char = '\u{2506}';

struct Grid {
    cells: Vec<Vec<char>>,
}

impl Grid {
    fn new(vp: &Viewport) -> Grid {
        let cols = vp.width.max(1.0) as usize;
        let rows = vp.height.max(1.0) as usize;
        Grid {
            cells: vec![vec![' '; cols]; rows],
        }
    }

    fn rows(&self) -> usize {
        self.cells.len()
    }

    fn cols(&self) -> usize {
        self.cells[0].len()
    }

    fn col(&self, x: f64) -> usize {
        clamp_cell(x, self.cols())
    }

    fn row(&self, y: f64) -> usize {
        clamp_cell(y, self.rows())
    }

    fn set(&mut self, row: usize, col: usize, c: char) {
        self.cells[row][col] = c;
    }

    fn set_if_empty(&mut self, row: usize, col: usize, c: char) {
        if self.cells[row][col] == ' ' {
            self.cells[row][col] = c;
        }
    }

    fn horizontal_dash(&mut self, line: &ReferenceLine) {
        let row = self.row(line.y1);
        for col in self.col(line.x1)..=self.col(line.x2) {
            self.set_if_empty(row, col, DASH_H);
        }
    }

    fn render(&self) -> String {
        self.cells
            .iter()
            .map(|r| r.iter().collect::<String>().trim_end().to_string())
            .join("\n")
    }
}

fn clamp_cell(v: f64, len: usize) -> usize {
    if v.is_nan() || v <= 0.0 {
        0
    } else {
        (v.floor() as usize).min(len - 1)
    }
}

/// Draws a geometry into a character grid sized by the viewport, followed
/// by a one-line legend.
pub fn render_chart(geometry: &Geometry, vp: &Viewport) -> String {
    let mut grid = Grid::new(vp);
    let legend = match geometry {
        Geometry::Histogram(h) => draw_histogram(&mut grid, h, vp),
        Geometry::Line(l) => draw_line(&mut grid, l),
        Geometry::Box(b) => draw_box(&mut grid, b),
    };
    let legend = format!("{}: {}", geometry.kind().label(), legend);
    format!("{}\n{}", grid.render(), legend.dimmed())
}

fn draw_histogram(grid: &mut Grid, h: &HistogramGeometry, vp: &Viewport) -> String {
    let bottom = grid.row(vp.plot_bottom()).max(1);
    for bar in &h.bins {
        if bar.height <= 0.0 {
            continue;
        }
        let top = grid.row(bar.y).min(bottom - 1);
        let first = grid.col(bar.x);
        let last = grid.col(bar.x + bar.width - 1e-9).max(first);
        for row in top..bottom {
            for col in first..=last {
                grid.set(row, col, BAR);
            }
        }
    }
    if let Some(line) = &h.reference {
        let col = grid.col(line.x1);
        for row in grid.row(line.y1)..bottom {
            grid.set_if_empty(row, col, DASH_V);
        }
    }
    let first = h.bins.first().map(|b| b.value).unwrap_or(0.0);
    let last = h.bins.last().map(|b| b.value).unwrap_or(0.0);
    let mut legend = format!(
        "{} distinct scores from {} to {}, tallest bar {}",
        h.bins.len(),
        first,
        last,
        h.max_count
    );
    if let Some(line) = &h.reference {
        legend.push_str(&format!(", mean {:.1}", line.value));
    }
    legend
}

fn draw_line(grid: &mut Grid, l: &LineGeometry) -> String {
    if let Some(line) = &l.reference {
        grid.horizontal_dash(line);
    }
    for (a, b) in l.points.iter().tuple_windows() {
        let (c0, c1) = (grid.col(a.x), grid.col(b.x));
        for col in c0..=c1 {
            let t = if c1 == c0 {
                0.0
            } else {
                (col - c0) as f64 / (c1 - c0) as f64
            };
            let row = grid.row(a.y + (b.y - a.y) * t);
            grid.set(row, col, POINT);
        }
    }
    if let [only] = l.points.as_slice() {
        let (row, col) = (grid.row(only.y), grid.col(only.x));
        grid.set(row, col, POINT);
    }
    let mut legend = format!("{} outcomes, sorted, from {} to {}", l.points.len(), l.min, l.max);
    if let Some(line) = &l.reference {
        legend.push_str(&format!(", mean {:.1}", line.value));
    }
    legend
}

fn draw_box(grid: &mut Grid, b: &BoxGeometry) -> String {
    if let Some(line) = &b.reference {
        grid.horizontal_dash(line);
    }
    let center = grid.col(b.center_x);
    let left = grid.col(b.center_x - b.box_width / 2.0);
    let right = grid.col(b.center_x + b.box_width / 2.0);
    for row in grid.row(b.high_y)..=grid.row(b.low_y) {
        grid.set(row, center, WHISKER);
    }
    for col in left..=right {
        let (low, high) = (grid.row(b.low_y), grid.row(b.high_y));
        grid.set(low, col, CAP);
        grid.set(high, col, CAP);
        for row in grid.row(b.q3_y)..=grid.row(b.q1_y) {
            grid.set(row, col, BAR);
        }
        let median = grid.row(b.q2_y);
        grid.set(median, col, MEDIAN);
    }
    for outlier in &b.outliers {
        let row = grid.row(outlier.y);
        grid.set(row, center, OUTLIER);
    }
    let s = &b.stats;
    format!(
        "Q1 {} \u{b7} median {} \u{b7} Q3 {} \u{b7} whiskers {}..{} \u{b7} {} outlier(s)",
        s.q1,
        s.q2,
        s.q3,
        s.low_whisker,
        s.high_whisker,
        b.outliers.len()
    )
}

/// The scoring guide, one card row per example.
pub fn rules_guide() -> String {
    let mut out = vec![format!("{}", RULES_TITLE.cyan().bold()), RULES_INTRO.to_string()];
    for section in RULE_SECTIONS {
        out.push(String::new());
        out.push(format!("{}", section.title.bold()));
        out.extend(section.lines.iter().map(|line| format!("  {}", line)));
        for example in section.examples {
            out.push(format!("    {}", board_display(&example.cards())));
            out.push(format!("    {}", format!("Example: {}", example.caption).italic()));
        }
    }
    out.push(String::new());
    out.push(format!("{}", "Important Notes".bold()));
    out.extend(RULES_NOTES.iter().map(|note| format!("  \u{2022} {}", note)));
    out.join("\n")
}

pub fn print_section(title: &str, content: &str) {
    println!("\n{}", title.cyan().bold());
    println!("  {}", content);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn print_success(msg: &str) {
    println!("{}", msg.green().bold());
}
