//! elrc-catalog entry point.
//!
//! Exit codes mirror the three run outcomes: 0 with records on stdout,
//! 1 with metadata fetch instructions, 2 with archive fetch directives.
use std::process::exit;

use log::debug;
use structopt::StructOpt;

use elrc_catalog::cli;
use elrc_catalog::error::Error;
use elrc_catalog::pipeline::{
    metadata_fetch_hint, CataloguePipeline, Pipeline, RunStatus, NUM_MAX,
};

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::ElrcCatalog::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::ElrcCatalog::Build(build) => {
            let max_id = build.max_id.unwrap_or(NUM_MAX);
            let pipeline = CataloguePipeline::new(build.src, max_id);
            match pipeline.run()? {
                RunStatus::NeedMetadata => {
                    println!("# Download all the JSON files first:");
                    println!("{}", metadata_fetch_hint(max_id));
                    exit(1);
                }
                RunStatus::NeedArchives(directives) => {
                    println!("# Download the zip files:");
                    for directive in directives {
                        println!("{}", directive);
                    }
                    exit(2);
                }
                RunStatus::Records(entries) => {
                    println!("# Add this to the index file:");
                    for entry in entries {
                        println!("{}", entry);
                    }
                }
            }
        }
    }
    Ok(())
}
