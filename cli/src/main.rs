//! h5vlheap CLI: resolve HDF5 variable-length string addresses

mod commands;
mod utils;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};

use h5vlheap::ResolveOptions;
use h5vlheap::options::DEFAULT_MAX_COLLECTION_SIZE;

use commands::{ResolveArgs, list_heap, resolve_dataset};

#[derive(Parser)]
#[command(
    name = "h5vlheap",
    version,
    about = "Resolve HDF5 variable-length string elements to file byte ranges",
    long_about = "h5vlheap reads the VL string descriptors of an HDF5 dataset and resolves each element to the absolute offset and length of its payload in the file's global heap.\n\nThe dataset's byte offset and size come from the HDF5 library (for example H5Dget_offset and H5Dget_storage_size).",
    author,
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GlobalArgs {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Reject global heap collections larger than this many bytes
    #[arg(long, value_name = "BYTES", global = true, default_value_t = DEFAULT_MAX_COLLECTION_SIZE)]
    max_collection_size: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the VL string descriptors stored at OFFSET..OFFSET+SIZE
    #[command(
        long_about = "Resolve the VL string descriptors of a contiguous dataset.\n\nExamples:\n  h5vlheap resolve data.h5 2048 64\n  h5vlheap resolve data.h5 0x800 64 --strings\n  h5vlheap resolve data.h5 2048 256 --dims 4,4 --start 0,0 --count 2,2\n"
    )]
    Resolve {
        /// Path to the HDF5 file
        file: String,
        /// Byte offset of the dataset's raw data (decimal or 0x-prefixed hex)
        offset: String,
        /// Size of the dataset's raw data in bytes
        size: String,
        #[command(flatten)]
        args: ResolveArgs,
    },
    /// List the objects of one global heap collection
    Heap {
        /// Path to the HDF5 file
        file: String,
        /// Address of the collection (decimal or 0x-prefixed hex)
        address: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.global.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_module("h5vlheap", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();

    let options =
        ResolveOptions::default().with_max_collection_size(cli.global.max_collection_size);

    match &cli.command {
        Some(Commands::Resolve {
            file,
            offset,
            size,
            args,
        }) => {
            let offset = utils::parse_u64(offset)?;
            let size = utils::parse_u64(size)?;
            resolve_dataset(file, offset, size, args, options)?;
        }
        Some(Commands::Heap {
            file,
            address,
            json,
        }) => {
            let address = utils::parse_u64(address)?;
            list_heap(file, address, *json, options)?;
        }
        None => {
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
