mod cli;
mod commands;
mod env_loader;
mod error;
mod proj;

fn main() {
    env_loader::load_dotenv();

    if let Err(err) = cli::run() {
        eprintln!("error: {}", error::describe(&err));
        std::process::exit(1);
    }
}
