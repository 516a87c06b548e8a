use clap::Parser;

use crate::{
    data::{Config, Program},
    error::{Error, Result},
    graphics::blend::parse_hex,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Bubbles that follow the mouse cursor around the window.
pub struct Args {
    /// Initial window size, as WIDTHxHEIGHT
    #[arg(long, default_value = "640x480")]
    pub size: String,
    /// Bubble colour
    #[arg(long, default_value = "#4dd6fd")]
    pub fill: String,
    /// Window background colour
    #[arg(long, default_value = "#242424")]
    pub background: String,
    /// Lock the frame rate instead of following the monitor
    #[arg(long)]
    pub fps: Option<f32>,
    /// Allow resizing the window
    #[arg(long)]
    pub resizable: bool,
    /// Only log warnings and errors
    #[arg(long)]
    pub quiet: bool,
}

fn parse_size(s: &str) -> Result<(u16, u16)> {
    let invalid = || Error::InvalidSize(s.to_string());

    let (w, h) = s.split_once('x').ok_or_else(invalid)?;

    let w = w.trim().parse::<u16>().map_err(|_| invalid())?;
    let h = h.trim().parse::<u16>().map_err(|_| invalid())?;

    Ok((w, h))
}

impl Program {
    pub fn from_args(args: &Args) -> Result<Self> {
        let size = parse_size(&args.size)?;

        let config = Config {
            fill: parse_hex(&args.fill)?,
            ..Config::default()
        };

        let background = parse_hex(&args.background)?;

        let mut prog = Program::new(config, size, background);
        prog.set_resizable(args.resizable);

        if let Some(rate) = args.fps {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(Error::InvalidFps(rate));
            }

            prog.lock_fps((rate * 1000.0) as u32);
        }

        Ok(prog)
    }
}
