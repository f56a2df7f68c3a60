use std::fs;
use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};
use kvbench::{AdapterError, AdapterRegistry, FieldMap, Properties, Result};
use log::{LevelFilter, info};

#[derive(Parser, Debug)]
#[clap(name = "kvbench", disable_help_subcommand = true)]
struct Opt {
    #[clap(long, value_name = "NAME", help = "Adapter to drive (replkv, shardkv, connkv)")]
    db: String,

    #[clap(long, value_name = "FILE", help = "TOML property file")]
    props: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[clap(name = "read", about = "Read a record's single field")]
    Read {
        #[clap(name = "TABLE")]
        table: String,

        #[clap(name = "KEY")]
        key: String,

        #[clap(name = "FIELD", help = "Field name to wrap the value under")]
        field: String,
    },

    #[clap(name = "insert", about = "Insert a record with a single value")]
    Insert {
        #[clap(name = "TABLE")]
        table: String,

        #[clap(name = "KEY")]
        key: String,

        #[clap(name = "FIELD")]
        field: String,

        #[clap(name = "VALUE")]
        value: String,
    },

    #[clap(name = "update", about = "Update a record with a single value")]
    Update {
        #[clap(name = "TABLE")]
        table: String,

        #[clap(name = "KEY")]
        key: String,

        #[clap(name = "FIELD")]
        field: String,

        #[clap(name = "VALUE")]
        value: String,
    },

    #[clap(name = "delete", about = "Delete a record")]
    Delete {
        #[clap(name = "TABLE")]
        table: String,

        #[clap(name = "KEY")]
        key: String,
    },
}

fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let opt = Opt::parse();
    if let Err(e) = run(opt) {
        eprintln!("{:?}", e);
        exit(1);
    }
}

fn run(opt: Opt) -> Result<()> {
    let props = match &opt.props {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|e| {
                AdapterError::InvalidProperties(format!("{}: {}", path.display(), e))
            })?;
            Properties::from_toml_str(&raw)?
        }
        None => Properties::new(),
    };

    let registry = AdapterRegistry::with_builtin();
    let adapter = registry.create(&opt.db, &props)?;
    info!("created adapter {}", opt.db);

    match opt.command {
        Command::Read { table, key, field } => {
            let record = adapter.read(&table, &key, &[field.as_str()])?;
            for (field, value) in record {
                println!("{}: {}", field, String::from_utf8_lossy(&value));
            }
        }
        Command::Insert { table, key, field, value } => {
            let values = FieldMap::from([(field, value.into_bytes())]);
            adapter.insert(&table, &key, &values)?;
        }
        Command::Update { table, key, field, value } => {
            let values = FieldMap::from([(field, value.into_bytes())]);
            adapter.update(&table, &key, &values)?;
        }
        Command::Delete { table, key } => {
            adapter.delete(&table, &key)?;
        }
    }

    adapter.close()
}
