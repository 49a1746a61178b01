//! famikb-host entry point.
//!
//! Bridges one USB keyboard and one USB mouse to a pico-ps2famikb adapter on
//! the I2C bus, so they can be used on a Famicom.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ Cli::parse + load_config      -- file, then CLI/env overrides
//!  └─ load_or_empty                 -- keymap file
//!  └─ run()
//!       ├─ discover + select_device (keyboard, mouse; may prompt on stdin)
//!       ├─ EvdevSources             (AsyncFd-registered device nodes)
//!       ├─ I2cFrameWriter           (/dev/i2c-<n>, address 0x17)
//!       └─ BridgeInputUseCase::run  (until Ctrl-C or a fatal error)
//! ```
//!
//! Everything runs on a single-threaded Tokio runtime: the loop only ever
//! waits on two file descriptors.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use famikb_core::KeyMap;
use famikb_host::infrastructure::storage::config::{
    load_config, AppConfig, PointerSetting, VideoStandard,
};
use famikb_host::infrastructure::storage::keymap_file;

#[cfg(target_os = "linux")]
use famikb_host::application::select_devices::{
    partition, select_device, DeviceDescriptor, DeviceKind,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// USB keyboard and mouse bridge for the pico-ps2famikb adapter.
///
/// Every option overrides the matching key of the config file.
#[derive(Debug, Parser)]
#[command(
    name = "famikb-host",
    about = "Bridges a USB keyboard and mouse to a pico-ps2famikb adapter over I2C",
    version
)]
struct Cli {
    /// Config file to read instead of `~/.config/famikb/config.toml`.
    #[arg(long, env = "FAMIKB_CONFIG")]
    config: Option<PathBuf>,

    /// I2C bus number the adapter is wired to (`/dev/i2c-<BUS>`).
    #[arg(long, env = "FAMIKB_BUS")]
    bus: Option<u8>,

    /// Video standard of the console: 224-line NTSC or 240-line PAL.
    #[arg(long, value_enum, env = "FAMIKB_STANDARD")]
    standard: Option<VideoStandard>,

    /// Shorthand for `--standard pal`.
    #[arg(long, env = "FAMIKB_PAL", conflicts_with = "standard")]
    pal: bool,

    /// Report an absolute pointer position or one-shot motion deltas.
    #[arg(long, value_enum, env = "FAMIKB_MODE")]
    mode: Option<PointerSetting>,

    /// Shorthand for `--mode relative`.
    #[arg(long, env = "FAMIKB_RELATIVE", conflicts_with = "mode")]
    relative: bool,

    /// Horizontal screen resolution, 1 to 256.
    #[arg(long, env = "FAMIKB_WIDTH")]
    width: Option<u16>,

    /// Keymap file mapping Linux key names to adapter scancodes.
    #[arg(long, env = "FAMIKB_KEYMAP")]
    keymap: Option<PathBuf>,

    /// Keyboard device node to use instead of auto-detection.
    #[arg(long, env = "FAMIKB_KEYBOARD")]
    keyboard: Option<PathBuf>,

    /// Mouse device node to use instead of auto-detection.
    #[arg(long, env = "FAMIKB_MOUSE")]
    mouse: Option<PathBuf>,
}

impl Cli {
    /// Overlays the options that were given onto `config`.
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(bus) = self.bus {
            config.bus.bus = bus;
        }
        if let Some(standard) = self.standard {
            config.display.standard = standard;
        } else if self.pal {
            config.display.standard = VideoStandard::Pal;
        }
        if let Some(mode) = self.mode {
            config.pointer.mode = mode;
        } else if self.relative {
            config.pointer.mode = PointerSetting::Relative;
        }
        if let Some(width) = self.width {
            config.display.width = width;
        }
        if let Some(path) = &self.keymap {
            config.keymap.path = Some(path.clone());
        }
        if let Some(path) = &self.keyboard {
            config.devices.keyboard = Some(path.clone());
        }
        if let Some(path) = &self.mouse {
            config.devices.mouse = Some(path.clone());
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply_to(&mut config);
    config.validate().context("invalid configuration")?;

    // `RUST_LOG` wins over the configured level.
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.logging.level)
            .with_context(|| format!("invalid log level {:?}", config.logging.level))?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("famikb-host {} starting", env!("CARGO_PKG_VERSION"));

    let keymap = keymap_file::load_or_empty(config.keymap.path.as_deref())
        .context("failed to load keymap")?;

    run(config, keymap).await
}

#[cfg(target_os = "linux")]
async fn run(config: AppConfig, keymap: KeyMap) -> anyhow::Result<()> {
    use famikb_core::{EventTranslator, InputState};
    use famikb_host::application::bridge_input::BridgeInputUseCase;
    use famikb_host::infrastructure::bus::i2c::I2cFrameWriter;
    use famikb_host::infrastructure::input_devices::evdev::{self, EvdevSources};

    // ── Device selection ──────────────────────────────────────────────────────
    let discovered = evdev::discover();
    let descriptors: Vec<_> = discovered.iter().map(|d| d.descriptor.clone()).collect();
    let (keyboards, mice) = partition(&descriptors);

    let keyboard_idx = choose(
        DeviceKind::Keyboard,
        &descriptors,
        &keyboards,
        config.devices.keyboard.as_deref(),
    )?;
    let mouse_idx = choose(DeviceKind::Mouse, &descriptors, &mice, config.devices.mouse.as_deref())?;

    for (kind, idx) in [(DeviceKind::Keyboard, keyboard_idx), (DeviceKind::Mouse, mouse_idx)] {
        if let Some(i) = idx {
            info!("active {kind}: {} ({})", descriptors[i].name, descriptors[i].path.display());
        }
    }

    // Unselected devices are closed when `slots` is dropped.
    let mut slots: Vec<_> = discovered.into_iter().map(|d| Some(d.device)).collect();
    let keyboard = keyboard_idx.and_then(|i| slots[i].take());
    let mouse = mouse_idx.and_then(|i| slots[i].take());
    drop(slots);

    if keyboard.is_none() && mouse.is_none() {
        anyhow::bail!("no input device attached; can't continue without a keyboard or mouse");
    }

    let sources = EvdevSources::new(keyboard, mouse).context("failed to register input devices")?;
    let presence = sources.presence();

    // ── Adapter ───────────────────────────────────────────────────────────────
    info!("initiating i2c connect on bus {}", config.bus.bus);
    let sink = I2cFrameWriter::open(config.bus.bus).context("failed to open I2C bus")?;

    let state = InputState::new(config.pointer_mode(), config.screen_bounds());
    let mut bridge =
        BridgeInputUseCase::new(sources, sink, EventTranslator::new(keymap), state, presence);
    bridge
        .send_handshake()
        .context("pico-ps2famikb not found, check config and wiring")?;

    info!("press LeftShift+LeftCtrl+Esc to take control of the input devices");

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler available; run until a fatal error instead.
            std::future::pending::<()>().await;
        }
    };
    bridge.run(shutdown).await?;

    info!("famikb-host stopped after {} frames", bridge.frames_sent());
    Ok(())
}

#[cfg(not(target_os = "linux"))]
async fn run(_config: AppConfig, _keymap: KeyMap) -> anyhow::Result<()> {
    anyhow::bail!("unsupported platform: famikb-host needs Linux evdev and i2c-dev")
}

/// Picks one device of `kind`; returns its index into `descriptors`.
#[cfg(target_os = "linux")]
fn choose(
    kind: DeviceKind,
    descriptors: &[DeviceDescriptor],
    indices: &[usize],
    preferred: Option<&std::path::Path>,
) -> anyhow::Result<Option<usize>> {
    // Resolve /dev/input/by-id symlinks to the event node enumeration reports.
    let preferred = preferred.map(|p| std::fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf()));
    let candidates: Vec<_> = indices.iter().map(|&i| &descriptors[i]).collect();

    let chosen = select_device(kind, &candidates, preferred.as_deref(), prompt_on_stdin)?;
    Ok(chosen.map(|c| indices[c]))
}

/// Lists the candidates and reads a choice from stdin. `None` on EOF.
#[cfg(target_os = "linux")]
fn prompt_on_stdin(kind: DeviceKind, candidates: &[&DeviceDescriptor]) -> Option<usize> {
    use std::io::{BufRead, Write};

    for (i, device) in candidates.iter().enumerate() {
        println!("{i} : {} ({})", device.name, device.path.display());
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock();
    loop {
        print!("Select {kind}: ");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        match lines.read_line(&mut line) {
            Ok(0) | Err(_) => return None,
            Ok(_) => {}
        }
        if let Ok(choice) = line.trim().parse::<usize>() {
            return Some(choice);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
