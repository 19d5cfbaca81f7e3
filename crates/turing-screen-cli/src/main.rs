//! Turing Smart Screen Control Tool
//!
//! CLI for driving a Turing Smart Screen directly over its serial port.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use turing_screen_hw::{
    open_serial, AnyDisplay, DisplayVariant, Rgb, SerialTransport, Transport, TuringDisplay,
};

use config::Config;

const DEFAULT_CONFIG: &str = "config/default.toml";

#[derive(Parser)]
#[command(name = "turingctl")]
#[command(about = "Control tool for Turing Smart Screen displays")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Serial device (overrides the configuration file)
    #[arg(short, long)]
    port: Option<String>,

    /// Hardware variant: auto, 1 or 2 (overrides the configuration file)
    #[arg(long)]
    variant: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show detected variant and display state
    Info,
    /// Clear the display to black
    Clear,
    /// Reset the display (variant 1 only)
    Reset,
    /// Set brightness (0-255)
    Brightness {
        #[arg(allow_negative_numbers = true)]
        level: i32,
    },
    /// Set the RGB backlight colour (variant 2 only)
    Backlight {
        #[arg(allow_negative_numbers = true)]
        red: i32,
        #[arg(allow_negative_numbers = true)]
        green: i32,
        #[arg(allow_negative_numbers = true)]
        blue: i32,
    },
    /// Show display content
    On {
        /// Brightness to show at on variant 2 (default: configured, else 255)
        #[arg(long)]
        brightness: Option<u8>,
    },
    /// Hide display content
    Off,
    /// Write the effective configuration to a TOML file
    WriteConfig {
        /// Output path
        output: PathBuf,
    },
    /// Draw an image file
    Image {
        /// Image path (any format the image crate reads)
        path: PathBuf,

        #[command(flatten)]
        placement: Placement,
    },
    /// Hide the display, draw an image, then reveal it at half brightness
    Demo {
        /// Image path
        path: PathBuf,

        /// Seconds to keep the process alive after drawing
        #[arg(long, default_value = "2")]
        hold: u64,
    },
}

/// Where to draw and which part of the source image to take.
#[derive(clap::Args, Debug, Default)]
struct Placement {
    /// Destination x
    #[arg(long, default_value = "0")]
    x: u16,
    /// Destination y
    #[arg(long, default_value = "0")]
    y: u16,
    /// Source x within the image
    #[arg(long, default_value = "0")]
    src_x: u32,
    /// Source y within the image
    #[arg(long, default_value = "0")]
    src_y: u32,
    /// Width to copy (default: rest of the image)
    #[arg(long)]
    width: Option<u32>,
    /// Height to copy (default: rest of the image)
    #[arg(long)]
    height: Option<u32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = load_config(&cli.config)?;
    if let Some(port) = cli.port {
        config.serial.device = port;
    }
    if let Some(variant) = cli.variant {
        config.display.variant = variant;
    }

    if let Commands::WriteConfig { output } = &cli.command {
        config.save(output)?;
        println!("Configuration written to: {}", output.display());
        return Ok(());
    }

    let mut display = open_display(&config)?;

    match cli.command {
        Commands::Info => {
            let state = display.state();
            println!("Display:");
            println!("  Device: {}", config.serial.device);
            println!("  Variant: {}", display.variant());
            println!("  Size: {}x{}", display.width(), display.height());
            println!("  Orientation: {}", state.orientation);
            println!("  Inversion: {}", state.inversion);
        }
        Commands::Clear => {
            display.clear()?;
            println!("Display cleared");
        }
        Commands::Reset => match &mut display {
            AnyDisplay::One(d) => {
                d.reset()?;
                println!("Display reset");
            }
            AnyDisplay::Two(_) => bail!("Reset is only available on variant 1 displays"),
        },
        Commands::Brightness { level } => {
            display.brightness(level)?;
            println!("Brightness set to: {}", level);
        }
        Commands::Backlight { red, green, blue } => {
            display.backlight(red, green, blue)?;
            println!("Backlight set to: ({}, {}, {})", red, green, blue);
        }
        Commands::On { brightness } => {
            let level = brightness.or(config.display.brightness).unwrap_or(255);
            set_power(&mut display, true, level)?;
            println!("Display enabled");
        }
        Commands::Off => {
            set_power(&mut display, false, 0)?;
            println!("Display disabled");
        }
        // Handled before the display is opened.
        Commands::WriteConfig { .. } => {}
        Commands::Image { path, placement } => {
            draw_image(&mut display, &path, &placement)?;
            println!("Image drawn: {}", path.display());
        }
        Commands::Demo { path, hold } => {
            display.enable(false)?;
            draw_image(&mut display, &path, &Placement::default())?;
            display.brightness(128)?;
            display.enable(true)?;
            info!("Demo image shown, holding for {}s", hold);
            std::thread::sleep(Duration::from_secs(hold));
        }
    }

    Ok(())
}

/// Turns the screen on or off unconditionally.
///
/// Each invocation starts from a fresh driver that assumes the screen is on,
/// so the remembered state cannot be trusted to skip the command.
fn set_power<T: Transport>(display: &mut AnyDisplay<T>, on: bool, level: u8) -> Result<()> {
    if on {
        display.screen_on(level)?;
    } else {
        display.screen_off()?;
    }
    Ok(())
}

/// Loads the configuration file, falling back to defaults when the default
/// path does not exist.
fn load_config(path: &Path) -> Result<Config> {
    if path == Path::new(DEFAULT_CONFIG) && !path.exists() {
        debug!("No configuration at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    let config = Config::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

fn open_display(config: &Config) -> Result<AnyDisplay<SerialTransport>> {
    let port = open_serial(&config.serial.device, &config.serial.settings())
        .with_context(|| format!("Failed to open {}", config.serial.device))?;
    let gate = config.display.gate();

    let mut display = if config.display.variant.eq_ignore_ascii_case("auto") {
        AnyDisplay::detect(port, gate)?
    } else {
        let variant: DisplayVariant = config.display.variant.parse()?;
        AnyDisplay::open(port, variant, gate)
            .with_context(|| format!("Display on {} is not a {}", config.serial.device, variant))?
    };

    display.invert(config.display.inversion()?);
    let orientation = config.display.orientation()?;
    if orientation != display.state().orientation {
        display.orientation(orientation)?;
    }
    if let Some(level) = config.display.brightness {
        display.brightness(level as i32)?;
    }
    Ok(display)
}

/// Reads an image and extracts the requested sub-rectangle as row-major RGB.
fn load_region(path: &Path, placement: &Placement) -> Result<(u32, u32, Vec<Rgb>)> {
    let image = image::open(path)
        .with_context(|| format!("Failed to load image {}", path.display()))?
        .to_rgb8();
    let (image_width, image_height) = image.dimensions();

    if placement.src_x >= image_width || placement.src_y >= image_height {
        bail!(
            "Source offset ({}, {}) is outside the {}x{} image",
            placement.src_x,
            placement.src_y,
            image_width,
            image_height
        );
    }
    let width = placement
        .width
        .unwrap_or(image_width)
        .min(image_width - placement.src_x);
    let height = placement
        .height
        .unwrap_or(image_height)
        .min(image_height - placement.src_y);

    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for row in placement.src_y..placement.src_y + height {
        for col in placement.src_x..placement.src_x + width {
            pixels.push(image.get_pixel(col, row).0);
        }
    }
    Ok((width, height, pixels))
}

fn draw_image<D: TuringDisplay>(display: &mut D, path: &Path, placement: &Placement) -> Result<()> {
    let (width, height, pixels) = load_region(path, placement)?;
    let width = u16::try_from(width).context("Image too wide")?;
    let height = u16::try_from(height).context("Image too tall")?;
    debug!(
        "Drawing {}x{} from {} at ({}, {})",
        width,
        height,
        path.display(),
        placement.x,
        placement.y
    );
    display.update_region(placement.x, placement.y, width, height, &pixels)?;
    Ok(())
}
