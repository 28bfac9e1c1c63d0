use stockcast_cli::{Cli, execute};

fn main() -> anyhow::Result<()> {
    let cli = Cli::import()?;
    stockcast_observability::init_with(cli.log_format);

    let report = execute(&cli)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
