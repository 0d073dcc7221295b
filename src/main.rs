#![warn(clippy::all)]

use std::io::{self, Write as _};

use structopt::StructOpt;

use atscrape::{Console, Opt, Result};

fn main() -> Result<()> {
    let opt = Opt::from_args();
    let mut cnsl = Console::term();
    let outcome = opt.run(&mut cnsl).map_err(|err| {
        io::stderr().flush().expect("Could not flush stderr");
        err
    })?;
    println!("{}", outcome);
    Ok(())
}
