use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use reqcorder_types::ArtifactKind;

#[derive(Parser)]
#[command(
    name = "reqcorder",
    about = "ReqCorder: execute HTTP requests from templates and record every exchange",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Echo logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Execute an HTTP request from a template file and record it
    Exec(ExecArgs),
    /// Display a specific template, request, or response
    Show(ShowArgs),
    /// List templates, requests, or responses in the store
    List(ListArgs),
    /// Compare two templates, requests, or responses
    Diff(DiffArgs),
    /// Print the version
    Version,
}

/// Artifact kind as named on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Templates,
    Requests,
    Responses,
}

impl From<KindArg> for ArtifactKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Templates => ArtifactKind::Template,
            KindArg::Requests => ArtifactKind::Request,
            KindArg::Responses => ArtifactKind::Response,
        }
    }
}

#[derive(Args)]
pub struct ExecArgs {
    /// Only show the response body and recording info
    #[arg(short, long, conflicts_with = "quiet")]
    pub min: bool,
    /// No output on stdout
    #[arg(short, long)]
    pub quiet: bool,
    pub template: PathBuf,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("artifact")
        .required(true)
        .args(["template", "request", "response"])
))]
pub struct ShowArgs {
    /// Template hash
    #[arg(long, visible_alias = "tp")]
    pub template: Option<String>,
    /// Request hash
    #[arg(long, visible_alias = "rq")]
    pub request: Option<String>,
    /// Response ID
    #[arg(long, visible_alias = "re")]
    pub response: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    pub kind: KindArg,
    /// Number of records to list, 0 for all (default from config)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
    /// Only records derived from this template hash
    #[arg(long, visible_alias = "tp", conflicts_with = "request")]
    pub template: Option<String>,
    /// Only responses to this request hash
    #[arg(long, visible_alias = "rq")]
    pub request: Option<String>,
}

#[derive(Args)]
pub struct DiffArgs {
    pub kind: KindArg,
    /// Source hash or response ID
    #[arg(short, long)]
    pub source: String,
    /// Target hash or response ID
    #[arg(short, long)]
    pub target: String,
    /// Word-level inline diff
    #[arg(short, long)]
    pub inline: bool,
}
