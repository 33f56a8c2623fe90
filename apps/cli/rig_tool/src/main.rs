use simplelog::*;
use std::error::Error;

mod apps;
use apps::RigTool;

fn main() -> Result<(), Box<dyn Error>> {
    let mut tool = RigTool::new();

    let level = match tool.verbose() {
        true => LevelFilter::Debug,
        false => LevelFilter::Info,
    };

    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;
    tool.run()
}
