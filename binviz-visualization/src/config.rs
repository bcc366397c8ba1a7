//! Command line arguments and viewer configuration

use binviz_io::ReadMode;
use clap::Parser;
use std::path::PathBuf;

/// `binviz` - view any file as a cloud of points.
///
/// Every three bytes of the file become one point. Repeated triplets are drawn
/// once and fade with how often they occur. Drag to rotate, scroll to zoom
/// (hold Shift to zoom faster), Space resets the view, R reloads the file,
/// O opens another one and Escape quits.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// The file to visualize.
    pub file: PathBuf,

    /// Initial window width in pixels.
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Initial window height in pixels.
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Memory-map the input instead of reading it into memory.
    #[arg(long)]
    pub mmap: bool,

    /// Wait for vertical sync when presenting frames.
    #[arg(long, overrides_with = "no_vsync")]
    pub vsync: bool,

    /// Present frames as fast as possible.
    #[arg(long = "no-vsync", overrides_with = "vsync")]
    pub no_vsync: bool,
}

/// Settings for one viewer session
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub title: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub read_mode: ReadMode,
    pub vsync: bool,
}

impl ViewerConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            title: "binviz".to_string(),
            path: path.into(),
            width: 640,
            height: 480,
            read_mode: ReadMode::Buffered,
            vsync: true,
        }
    }

    /// Window title for the current file
    pub fn window_title(&self) -> String {
        match self.path.file_name() {
            Some(name) => format!("{} - {}", self.title, name.to_string_lossy()),
            None => self.title.clone(),
        }
    }
}

impl From<Args> for ViewerConfig {
    fn from(args: Args) -> Self {
        Self {
            width: args.width.max(1),
            height: args.height.max(1),
            read_mode: if args.mmap {
                ReadMode::PreferMmap
            } else {
                ReadMode::Buffered
            },
            vsync: !args.no_vsync,
            ..ViewerConfig::new(args.file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("binviz").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::from(parse(&["data.bin"]).unwrap());
        assert_eq!(config.path, PathBuf::from("data.bin"));
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.read_mode, ReadMode::Buffered);
        assert!(config.vsync);
        assert_eq!(config.window_title(), "binviz - data.bin");
    }

    #[test]
    fn test_options() {
        let args = parse(&[
            "--width",
            "800",
            "--height",
            "600",
            "--mmap",
            "--no-vsync",
            "a.bin",
        ])
        .unwrap();
        let config = ViewerConfig::from(args);
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.read_mode, ReadMode::PreferMmap);
        assert!(!config.vsync);
    }

    #[test]
    fn test_last_vsync_flag_wins() {
        let config = ViewerConfig::from(parse(&["--no-vsync", "--vsync", "a.bin"]).unwrap());
        assert!(config.vsync);
    }

    #[test]
    fn test_zero_size_is_raised() {
        let config = ViewerConfig::from(parse(&["--width", "0", "a.bin"]).unwrap());
        assert_eq!(config.width, 1);
    }

    #[test]
    fn test_missing_file_argument() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_help_is_not_a_failure() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }
}
