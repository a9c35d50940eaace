use anyhow::Context;
use argh::FromArgs;
use movie_shell::Interpreter;
use movie_shell::env::{COLLECTION_PATH_VAR, Environment};
use movie_shell::logging;
use movie_shell::source::ConsoleSource;

/// Interactive shell over the movie collection stored in the file named by MOVIE_COLLECTION.
#[derive(FromArgs)]
struct Args {
    /// tracing filter directives, e.g. `debug` or `movie_shell=info`; overrides RUST_LOG
    #[argh(option)]
    log: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    logging::init(args.log.as_deref());

    let env = Environment::new();
    let mut shell = Interpreter::from_environment(&env, Box::new(std::io::stdout()))
        .with_context(|| format!("cannot load the collection named by {COLLECTION_PATH_VAR}"))?;

    println!("Data loaded successfully. You are now in interactive mode");
    println!("Type 'help' to see the list of commands");

    let mut console = ConsoleSource::new().context("cannot open the console")?;
    shell.run(&mut console)?;
    Ok(())
}
