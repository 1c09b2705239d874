use clap::Parser;
use crsdefs::config::GeneratorConfig;
use crsdefs::generator::CrsTableGenerator;
use crsdefs::result::Error;
use crsdefs::srs::defaults::WGS84;
use crsdefs::ProjDb;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Writes every CRS in the PROJ database as a named PROJ string constant
struct Cli {
    /// PROJ database to read, found through PROJ_DATA / PROJ_LIB when omitted
    #[arg(long)]
    proj_db: Option<PathBuf>,

    /// File to write
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = GeneratorConfig::resolve(cli.proj_db, cli.output)?;
    let db = ProjDb::open(&config.proj_db)?;
    CrsTableGenerator::new(&db, WGS84)?.run(&config.output)?;
    db.close()
}
