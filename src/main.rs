use std::{
    env,
    io::{self, Write},
};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mingit::cmd::{self, Commands};
use mingit::oid::Oid;
use mingit::repository::Repository;

fn repo_in_cwd() -> Result<Repository, anyhow::Error> {
    Ok(Repository::open(
        env::current_dir().with_context(|| "Can't get current working directory")?,
    ))
}

fn main() -> Result<(), anyhow::Error> {
    // diagnostics go to stderr so stdout stays clean for command output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = cmd::Cli::parse();

    match &cli.command {
        Commands::Init { root_path } => {
            let root = match root_path {
                Some(root) => root.to_path_buf(),
                None => {
                    env::current_dir().with_context(|| "Can't get current working directory")?
                }
            };
            Repository::open(root).init()?;
            println!("Initialized git directory");
        }
        Commands::CatFile { pretty, object } => {
            anyhow::ensure!(*pretty, "cat-file only knows pretty-printing; pass -p");

            let (_header, payload) = repo_in_cwd()?.cat_file(&Oid::from_hex(object)?)?;
            io::stdout().write_all(&payload)?;
        }
        Commands::HashObject { write, file } => {
            let oid = repo_in_cwd()?.hash_object(file, *write)?;
            println!("{oid}");
        }
        Commands::LsTree { name_only, object } => {
            let entries = repo_in_cwd()?.ls_tree(&Oid::from_hex(object)?)?;

            let mut stdout = io::stdout().lock();
            for entry in entries {
                if !*name_only {
                    let kind = if entry.mode.is_tree() { "tree" } else { "blob" };
                    write!(stdout, "{} {} {}\t", entry.mode, kind, entry.oid)?;
                }
                stdout.write_all(&entry.name)?;
                writeln!(stdout)?;
            }
        }
        Commands::WriteTree {} => {
            let oid = repo_in_cwd()?.write_tree()?;
            println!("{oid}");
        }
        Commands::CommitTree {
            tree,
            parent,
            message,
        } => {
            let tree = Oid::from_hex(tree)?;
            let parent = parent.as_deref().map(Oid::from_hex).transpose()?;

            let oid = repo_in_cwd()?.commit_tree(tree, parent, message.clone())?;
            println!("{oid}");
        }
    }

    Ok(())
}
