// SPDX-License-Identifier: MPL-2.0
//! Command-line parsing.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: fbplay [options] <path>

Options:
  -z <zoom>           scale decoded frames by this integer factor
  -m <magnify>        replicate every pixel into a magnify x magnify block
  -s                  no sound
  -v                  no video
  --config-dir <dir>  read settings.toml from <dir>
  -h, --help          show this help

Keys:
  l h  j k  J K       seek +/- short, normal, long step (prefix a count)
  <n>%                seek to n percent of the duration
  i                   show position
  p, space            pause; only p resumes
  q                   quit
";

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Play(Options),
    Help,
}

/// Playback options. `None` leaves the value to the config file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Options {
    pub path: PathBuf,
    pub zoom: Option<u32>,
    pub magnify: Option<u32>,
    pub no_audio: bool,
    pub no_video: bool,
    pub config_dir: Option<PathBuf>,
}

/// Parses arguments, program name excluded.
pub fn parse(args: Vec<OsString>) -> Result<Invocation> {
    let mut args = pico_args::Arguments::from_vec(args);
    if args.contains(["-h", "--help"]) {
        return Ok(Invocation::Help);
    }

    let zoom = args.opt_value_from_str("-z")?;
    let magnify = args.opt_value_from_str("-m")?;
    let no_audio = args.contains("-s");
    let no_video = args.contains("-v");
    let config_dir = args.opt_value_from_os_str("--config-dir", |s| {
        Ok::<_, std::convert::Infallible>(PathBuf::from(s))
    })?;

    let rest = args.finish();
    if let Some(flag) = rest
        .iter()
        .find(|arg| arg.to_string_lossy().starts_with('-'))
    {
        return Err(Error::Usage(format!(
            "unknown option {}",
            flag.to_string_lossy()
        )));
    }
    // The last positional argument is the media path.
    let path = rest
        .into_iter()
        .last()
        .map(PathBuf::from)
        .ok_or_else(|| Error::Usage("missing media path".into()))?;

    if zoom == Some(0) {
        return Err(Error::Usage("zoom must be at least 1".into()));
    }

    Ok(Invocation::Play(Options {
        path,
        zoom,
        magnify,
        no_audio,
        no_video,
        config_dir,
    }))
}
