// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use clap::{Parser, Subcommand, ValueEnum};
use k8scatalog::catalog::{AndFilter, FieldFilter, OrFilter, SkipSubresourceFilter};

#[derive(Parser, Debug)]
#[command(name = "k8scatalog")]
#[command(
    author,
    version,
    about = "Discover and filter the resource types served by a Kubernetes cluster"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Kubernetes context to use (defaults to the saved or current context)
    #[arg(short, long, value_name = "CONTEXT")]
    pub context: Option<String>,

    /// Only index resources announced in this API group ("core" for the core group)
    #[arg(short, long, value_name = "GROUP")]
    pub group: Option<String>,

    /// Only index resources announced in this API version
    #[arg(long, value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Drop status subresources
    #[arg(long)]
    pub skip_status: bool,

    /// Keep only resources whose schema has this dotted field path (repeatable)
    #[arg(long = "has-field", value_name = "PATH")]
    pub has_field: Vec<String>,

    /// Keep resources having any of the --has-field paths instead of all of them
    #[arg(long, requires = "has_field")]
    pub any_field: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Omit column headers in output
    #[arg(long)]
    pub no_headers: bool,

    /// Ignore the cached discovery snapshot and fetch a new one
    #[arg(long)]
    pub refresh: bool,

    /// Persist --context, --group and --api-version as defaults
    #[arg(long)]
    pub save: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List every resource and the group/versions serving it (default)
    List,

    /// Show every group/version serving a resource
    Describe {
        /// Plural resource name, e.g. "deployments"
        name: String,
    },

    /// Check whether each version of a resource has a field
    HasField {
        /// Plural resource name, e.g. "deployments"
        name: String,
        /// Dotted field path, e.g. "spec.replicas"
        path: String,
    },
}

#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

/// Group name as given on the command line, mapped to discovery's spelling
pub fn normalize_group(group: &str) -> &str {
    if group == "core" { "" } else { group }
}

/// Filter built from --skip-status, --has-field and --any-field
pub fn build_filter(args: &Args) -> AndFilter {
    let mut filter = AndFilter::new();

    if args.skip_status {
        filter.push(SkipSubresourceFilter);
    }

    if args.any_field && !args.has_field.is_empty() {
        let mut any = OrFilter::new();
        for path in &args.has_field {
            any.push(FieldFilter::from_dotted(path));
        }
        filter.push(any);
    } else {
        for path in &args.has_field {
            filter.push(FieldFilter::from_dotted(path));
        }
    }

    filter
}
