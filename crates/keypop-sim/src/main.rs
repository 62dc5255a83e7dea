use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use keypop::recording::{Journal, RecordingSurface};
use keypop::PopupController;
use keypop_core::config::Config;
use keypop_core::item::{Anchor, Bounds, KeyCode};
use keypop_core::layout::{HostMetrics, HostMode, Orientation};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "keypop-sim",
    about = "Replay one key press gesture and print every popup surface call as JSON lines"
)]
struct Cli {
    /// Label of the pressed key
    #[arg(long, default_value = "e")]
    label: String,
    /// Key code; defaults to the label's first code point
    #[arg(long, allow_hyphen_values = true)]
    code: Option<i32>,
    /// Treat the key as an emoji cell
    #[arg(long)]
    emoji: bool,
    /// Comma-separated alternates offered on long press
    #[arg(long, value_delimiter = ',')]
    alternates: Vec<String>,
    /// Anchor x within the keyboard view
    #[arg(long, default_value_t = 0.0)]
    x: f32,
    #[arg(long, default_value_t = 0.0)]
    y: f32,
    #[arg(long, default_value_t = 100.0)]
    width: f32,
    #[arg(long, default_value_t = 150.0)]
    height: f32,
    /// Width of the keyboard view
    #[arg(long, default_value_t = 1080.0)]
    container_width: f32,
    /// Nominal key size as WIDTHxHEIGHT; defaults to the anchor size
    #[arg(long, value_parser = parse_size)]
    key_size: Option<(f32, f32)>,
    #[arg(long, value_enum, default_value_t = OrientationArg::Portrait)]
    orientation: OrientationArg,
    #[arg(long, value_enum, default_value_t = ModeArg::Full)]
    mode: ModeArg,
    /// Pointer sample X,Y relative to the key (repeatable)
    #[arg(long = "move", value_parser = parse_point, allow_hyphen_values = true)]
    moves: Vec<(f32, f32)>,
    /// Stop after the preview; never open the picker
    #[arg(long)]
    no_extend: bool,
    /// Config file (defaults to the user config)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Full,
    Compact,
    Emoji,
}

fn parse_point(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected X,Y, got '{}'", s))?;
    let x = x.trim().parse().map_err(|e| format!("bad x '{}': {}", x, e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y '{}': {}", y, e))?;
    Ok((x, y))
}

fn parse_size(s: &str) -> Result<(f32, f32), String> {
    let (w, h) = s.split_once('x').ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w = w.trim().parse().map_err(|e| format!("bad width '{}': {}", w, e))?;
    let h = h.trim().parse().map_err(|e| format!("bad height '{}': {}", h, e))?;
    Ok((w, h))
}

impl Cli {
    fn anchor(&self) -> Anchor {
        let bounds = Bounds::new(self.x, self.y, self.width, self.height);
        let anchor = if self.emoji {
            Anchor::emoji(self.label.clone(), bounds)
        } else {
            let code = self
                .code
                .or_else(|| self.label.chars().next().map(|c| c as i32))
                .unwrap_or(0);
            Anchor::text_key(KeyCode(code), self.label.clone(), bounds)
        };
        anchor.with_alternates(self.alternates.iter().cloned())
    }

    fn host(&self) -> HostMetrics {
        let (nominal_key_width, nominal_key_height) =
            self.key_size.unwrap_or((self.width, self.height));
        HostMetrics {
            container_width: self.container_width,
            nominal_key_width,
            nominal_key_height,
            orientation: match self.orientation {
                OrientationArg::Portrait => Orientation::Portrait,
                OrientationArg::Landscape => Orientation::Landscape,
            },
            mode: match self.mode {
                ModeArg::Full => HostMode::Full,
                ModeArg::Compact => HostMode::Compact,
                ModeArg::Emoji => HostMode::EmojiGrid,
            },
        }
    }
}

/// Prints and clears everything recorded since the last flush.
fn flush(journal: &Journal) -> Result<()> {
    for entry in journal.borrow_mut().drain(..) {
        println!("{}", serde_json::to_string(&entry).context("serializing surface call")?);
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("keypop=info".parse().context("parsing log directive")?),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().context("loading config")?,
    };

    let anchor = cli.anchor();
    let journal = Journal::default();
    let mut controller = PopupController::new(
        &config,
        cli.host(),
        RecordingSurface::new("preview", journal.clone()),
        RecordingSurface::new("extended", journal.clone()),
    );
    info!(label = %cli.label, alternates = anchor.alternates.len(), "replaying gesture");

    controller.show(&anchor);
    flush(&journal)?;

    if !cli.no_extend {
        if let Some(layout) = controller.extend(&anchor) {
            println!("{}", json!({ "event": "layout", "layout": layout }));
        }
        flush(&journal)?;

        for &(x, y) in &cli.moves {
            let in_bounds = controller.propagate_motion_event(&anchor, x, y);
            flush(&journal)?;
            println!(
                "{}",
                json!({
                    "event": "motion",
                    "x": x,
                    "y": y,
                    "in_bounds": in_bounds,
                    "active_slot": controller.active_slot(),
                })
            );
        }
    }

    let selected = controller.active_item_content(&anchor).cloned();
    println!("{}", json!({ "event": "release", "content": selected }));
    controller.hide();
    flush(&journal)?;

    Ok(())
}
