//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "elrc-catalog",
    about = "catalogue builder for ELRC-SHARE parallel corpora."
)]
pub enum ElrcCatalog {
    #[structopt(about = "Build catalogue records from exported metadata and archives")]
    Build(Build),
}

#[derive(Debug, StructOpt)]
/// Build command and parameters.
pub struct Build {
    #[structopt(
        parse(from_os_str),
        help = "directory holding the {id}.json and {id}.zip exports"
    )]
    pub src: PathBuf,
    #[structopt(
        long = "max-id",
        help = "exclusive upper bound of the identifier range. Default is 5000."
    )]
    pub max_id: Option<usize>,
}
