//! Terminal front-end for frequency snapshots.
//!
//! Each frame is a header line followed by a legend of per-core entries:
//! core name, latest value in GHz and a sparkline of the whole history,
//! scaled into the padded global range. Entries wrap into extra columns
//! once a column holds `max_legend_rows` cores.

use freq_config::DisplayConfig;
use freq_core::{CoreSeries, FrequencyRange, Renderer, Result, Snapshot};
use std::io::Write;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const CLEAR: &str = "\x1b[H\x1b[2J";
const COLUMN_GAP: &str = "   ";

/// Number of legend columns needed for `cores` entries.
pub fn legend_columns(cores: usize, max_rows: usize) -> usize {
    cores.div_ceil(max_rows.max(1))
}

/// One glyph per reading, padded with spaces to `width`.
pub fn sparkline(readings: &[f64], range: FrequencyRange, width: usize) -> String {
    let top = (BARS.len() - 1) as f64;
    let mut line: String = readings
        .iter()
        .map(|&mhz| BARS[(range.fraction(mhz) * top).round() as usize])
        .collect();
    let drawn = readings.len();
    if drawn < width {
        line.extend(std::iter::repeat(' ').take(width - drawn));
    }
    line
}

pub struct TerminalRenderer<W> {
    out:             W,
    max_legend_rows: usize,
    range_padding:   f64,
    clear_screen:    bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn from_config(config: &DisplayConfig, out: W) -> Self {
        Self {
            out,
            max_legend_rows: config.max_legend_rows.max(1),
            range_padding:   config.range_padding,
            clear_screen:    config.clear_screen,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn entry(&self, series: &CoreSeries, scale: FrequencyRange, width: usize) -> String {
        let latest = series
            .latest()
            .map(|mhz| format!("{:>5.2} GHz", mhz / 1000.0))
            .unwrap_or_else(|| "   -- GHz".to_string());
        format!(
            "{:<6}{latest} {}",
            series.core.to_string(),
            sparkline(&series.readings, scale, width)
        )
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()> {
        let scale = snapshot.range.padded(self.range_padding);
        let columns = legend_columns(snapshot.cores.len(), self.max_legend_rows);
        let rows = snapshot.cores.len().div_ceil(columns.max(1));

        if self.clear_screen {
            write!(self.out, "{CLEAR}")?;
        }
        writeln!(
            self.out,
            "CPU frequency [GHz]  tick {}  {}  scale {:.2}-{:.2}",
            snapshot.tick,
            snapshot.taken_at.format("%H:%M:%S"),
            scale.min / 1000.0,
            scale.max / 1000.0
        )?;

        // Column-major fill: the first column holds cores 0..rows.
        for row in 0..rows {
            let line = (0..columns)
                .filter_map(|col| snapshot.cores.get(col * rows + row))
                .map(|series| self.entry(series, scale, snapshot.capacity))
                .collect::<Vec<_>>()
                .join(COLUMN_GAP);
            writeln!(self.out, "{}", line.trim_end())?;
        }

        if !snapshot.skipped.is_empty() {
            let names: Vec<String> = snapshot.skipped.iter().map(ToString::to_string).collect();
            writeln!(self.out, "no reading this tick: {}", names.join(", "))?;
        }
        self.out.flush()?;
        Ok(())
    }
}
