use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "fragrun",
    author,
    version,
    about = "Run ShaderToy-style fragment shaders in a desktop window",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// File holding the `mainImage` body (defaults to `shd.frag`).
    #[arg(value_name = "SHADER", env = "FRAGRUN_SHADER")]
    pub shader: Option<PathBuf>,

    /// Initial window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Window title.
    #[arg(long)]
    pub title: Option<String>,

    /// Optional FPS cap (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Present without waiting for vertical blank.
    #[arg(long)]
    pub no_vsync: bool,

    /// Start with playback paused at time zero (toggle with Space).
    #[arg(long)]
    pub paused: bool,

    /// Configuration file to read instead of the per-user default.
    #[arg(long, value_name = "FILE", env = "FRAGRUN_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Wrap and validate a shader without opening a window.
    Check {
        #[arg(value_name = "SHADER")]
        shader: PathBuf,
    },
    /// Print the wrapped fragment shader that would be compiled.
    Wrap {
        #[arg(value_name = "SHADER")]
        shader: PathBuf,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from([
            "fragrun",
            "demo.frag",
            "--size",
            "1280x720",
            "--fps",
            "30",
            "--no-vsync",
            "--paused",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.shader, Some(PathBuf::from("demo.frag")));
        assert_eq!(cli.run.size.as_deref(), Some("1280x720"));
        assert_eq!(cli.run.fps, Some(30.0));
        assert!(cli.run.no_vsync);
        assert!(cli.run.paused);
    }

    #[test]
    fn parses_check_subcommand() {
        let cli = Cli::try_parse_from(["fragrun", "check", "demo.frag"]).unwrap();
        match cli.command {
            Some(Command::Check { shader }) => assert_eq!(shader, PathBuf::from("demo.frag")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
