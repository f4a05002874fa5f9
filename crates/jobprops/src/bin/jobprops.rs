use clap::{CommandFactory, FromArgMatches};

use jobprops::cli::{RootOptions, SubCommand, command_flags, command_parse, command_render};
use jobprops::common::setup::setup_logging;

fn main() -> anyhow::Result<()> {
    let matches = RootOptions::command().get_matches();
    let top_opts = match RootOptions::from_arg_matches(&matches) {
        Ok(opts) => opts,
        Err(error) => error.exit(),
    };

    setup_logging(top_opts.common.debug);

    let result = match top_opts.subcmd {
        SubCommand::Parse(opts) => command_parse(opts),
        SubCommand::Flags => command_flags(),
        SubCommand::Render(opts) => command_render(opts),
    };

    if let Err(e) = result {
        log::error!("{e:?}");
        std::process::exit(1);
    }

    Ok(())
}
