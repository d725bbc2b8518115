//! Command-line argument parsing.

use clap::Parser;
use freq_config::FreqConfig;
use freq_core::{CoreId, Strategy};
use std::path::PathBuf;

/// freqplot - rolling per-core CPU frequency view
#[derive(Parser, Debug)]
#[command(name = "freqplot")]
#[command(about = "Sample per-core CPU clock frequency and draw a rolling history")]
#[command(version)]
pub struct Args {
    /// Path to configuration file (optional, defaults used if not found)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Cores to sample, comma separated (default: every core)
    #[arg(long, value_delimiter = ',')]
    pub cores: Option<Vec<usize>>,

    /// Acquisition strategy: library or direct
    #[arg(short, long)]
    pub strategy: Option<Strategy>,

    /// Sampling interval in milliseconds
    #[arg(short, long)]
    pub interval_ms: Option<u64>,

    /// Readings kept per core
    #[arg(long)]
    pub history: Option<usize>,
}

impl Args {
    /// Overlay command-line values on top of the loaded configuration.
    pub fn apply(&self, config: &mut FreqConfig) {
        if let Some(cores) = &self.cores {
            config.sampling.cores = Some(cores.iter().copied().map(CoreId).collect());
        }
        if let Some(strategy) = self.strategy {
            config.sampling.strategy = strategy;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.sampling.interval_ms = interval_ms;
        }
        if let Some(history) = self.history {
            config.sampling.history = history;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "freqplot", "--cores", "0,2,5", "--strategy", "direct", "--history", "60",
        ]);
        let mut config = FreqConfig::default();
        args.apply(&mut config);

        assert_eq!(
            config.sampling.cores,
            Some(vec![CoreId(0), CoreId(2), CoreId(5)])
        );
        assert_eq!(config.sampling.strategy, Strategy::Direct);
        assert_eq!(config.sampling.history, 60);
        assert_eq!(config.sampling.interval_ms, 100);
    }

    #[test]
    fn no_flags_keep_config() {
        let args = Args::parse_from(["freqplot"]);
        let mut config = FreqConfig::default();
        config.sampling.interval_ms = 250;
        args.apply(&mut config);
        assert_eq!(config.sampling.interval_ms, 250);
        assert!(config.sampling.cores.is_none());
    }

    #[test]
    fn unknown_strategy_rejected() {
        assert!(Args::try_parse_from(["freqplot", "--strategy", "psutil"]).is_err());
    }
}
