//! Table Fold CLI
//!
//! Command-line tool for merging tabular record sets and reconciling them
//! against previously published snapshots.

use clap::{Parser, Subcommand};
use fold_core::{
    latest_snapshot, merge, preserve, read_csv, scan_snapshots, select_confirmed, write_csv,
    write_csv_string, JoinKind, MergeOptions, MergeProfile, OverrideRule, DEFAULT_STATUS_VALUE,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fold-cli")]
#[command(about = "Merge and reconcile tabular record sets", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a secondary CSV into a primary CSV on key columns
    Merge {
        /// Primary (preferred) input CSV
        #[arg(short, long)]
        primary: PathBuf,

        /// Secondary input CSV
        #[arg(short, long)]
        secondary: PathBuf,

        /// Key column(s) defining row identity
        #[arg(short, long)]
        key: Vec<String>,

        /// Columns where the secondary value wins
        #[arg(long)]
        prefer_right: Vec<String>,

        /// Placeholder key values to exclude (replaces the default set)
        #[arg(long)]
        placeholder: Vec<String>,

        /// Flag column for the per-row override rule
        #[arg(long, requires = "override_value")]
        override_column: Option<String>,

        /// Flag value that forces the secondary side to win
        #[arg(long, requires = "override_column")]
        override_value: Option<String>,

        /// Join kind: outer, left, inner or right
        #[arg(long, default_value = "outer")]
        how: String,

        /// Load key columns and options from a profile JSON instead of flags
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Output file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (csv or json)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Append a _merge provenance column to the output
        #[arg(long)]
        indicator: bool,
    },

    /// Carry operator-edited columns from a snapshot into a fresh CSV
    Preserve {
        /// Snapshot CSV to preserve from
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Directory of published snapshots (used with --name)
        #[arg(long)]
        snapshot_dir: Option<PathBuf>,

        /// Snapshot series name to resolve in --snapshot-dir
        #[arg(long)]
        name: Option<String>,

        /// Freshly computed input CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Key column(s) defining row identity
        #[arg(short, long)]
        key: Vec<String>,

        /// Column(s) to preserve from the snapshot
        #[arg(long)]
        preserve: Vec<String>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Keep only rows whose key was confirmed in a snapshot
    SelectConfirmed {
        /// Snapshot CSV holding the confirmations
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Directory of published snapshots (used with --name)
        #[arg(long)]
        snapshot_dir: Option<PathBuf>,

        /// Snapshot series name to resolve in --snapshot-dir
        #[arg(long)]
        name: Option<String>,

        /// Input CSV to filter
        #[arg(short, long)]
        input: PathBuf,

        /// Key column(s) defining row identity
        #[arg(short, long)]
        key: Vec<String>,

        /// Column holding the confirmation status
        #[arg(long, default_value = "action")]
        status_column: String,

        /// Status value that counts as confirmed
        #[arg(long, default_value = DEFAULT_STATUS_VALUE)]
        status_value: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Parse and display a single CSV file
    Show {
        /// Path to CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,

        /// Columns to display (comma-separated)
        #[arg(short, long)]
        columns: Option<String>,
    },

    /// Look up a row or column index by label
    Locate {
        /// Path to CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Row label to find in the first column (case-insensitive)
        #[arg(long)]
        row: Option<String>,

        /// Column name to find
        #[arg(long)]
        column: Option<String>,
    },

    /// List published snapshot series in one or more directories
    Snapshots {
        /// Root directories to scan
        #[arg(short, long, required = true)]
        root: Vec<PathBuf>,

        /// Show every version of each series
        #[arg(short, long)]
        verbose: bool,
    },

    /// Create a merge profile template
    CreateProfile {
        /// Output path for the profile JSON
        #[arg(short, long)]
        output: PathBuf,

        /// Key column(s) for the profile
        #[arg(short, long, required = true)]
        key: Vec<String>,

        /// Columns where the secondary value wins
        #[arg(long)]
        prefer_right: Vec<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> fold_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            primary,
            secondary,
            key,
            prefer_right,
            placeholder,
            override_column,
            override_value,
            how,
            profile,
            output,
            format,
            indicator,
        } => cmd_merge(
            &primary,
            &secondary,
            key,
            prefer_right,
            placeholder,
            override_column,
            override_value,
            &how,
            profile.as_deref(),
            output.as_deref(),
            &format,
            indicator,
        ),
        Commands::Preserve {
            snapshot,
            snapshot_dir,
            name,
            input,
            key,
            preserve,
            output,
        } => cmd_preserve(snapshot, snapshot_dir, name, &input, &key, &preserve, &output),
        Commands::SelectConfirmed {
            snapshot,
            snapshot_dir,
            name,
            input,
            key,
            status_column,
            status_value,
            output,
        } => cmd_select_confirmed(
            snapshot,
            snapshot_dir,
            name,
            &input,
            &key,
            &status_column,
            &status_value,
            &output,
        ),
        Commands::Show {
            file,
            limit,
            columns,
        } => cmd_show(&file, limit, columns),
        Commands::Locate { file, row, column } => cmd_locate(&file, row, column),
        Commands::Snapshots { root, verbose } => cmd_snapshots(&root, verbose),
        Commands::CreateProfile {
            output,
            key,
            prefer_right,
        } => cmd_create_profile(&output, key, prefer_right),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_merge(
    primary_path: &std::path::Path,
    secondary_path: &std::path::Path,
    key: Vec<String>,
    prefer_right: Vec<String>,
    placeholder: Vec<String>,
    override_column: Option<String>,
    override_value: Option<String>,
    how: &str,
    profile: Option<&std::path::Path>,
    output: Option<&std::path::Path>,
    format: &str,
    indicator: bool,
) -> fold_core::Result<()> {
    let how: JoinKind = match how.parse() {
        Ok(kind) => kind,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(1);
        }
    };

    let (key_columns, options) = match profile {
        Some(path) => {
            let profile = MergeProfile::load(path)?;
            (profile.key_columns.clone(), profile.options())
        }
        None => {
            let mut options = MergeOptions {
                prefer_right,
                ..Default::default()
            };
            if !placeholder.is_empty() {
                options.placeholders = placeholder;
            }
            if let (Some(column), Some(value)) = (override_column, override_value) {
                options.override_rule = Some(OverrideRule { column, value });
            }
            (key, options)
        }
    };

    let primary = read_csv(primary_path)?;
    let secondary = read_csv(secondary_path)?;

    let result = merge(&primary, &secondary, &key_columns, how, &options)?;

    for (column, reason) in &result.unresolved {
        eprintln!("Warning: column '{}' left unresolved: {}", column, reason);
    }

    let dataset = if indicator {
        result.with_indicator_column()
    } else {
        result.dataset
    };

    let rendered = match format.to_lowercase().as_str() {
        "csv" => write_csv_string(&dataset)?,
        "json" => serde_json::to_string_pretty(&dataset).map_err(fold_core::Error::Json)?,
        _ => {
            eprintln!("Unknown format: {}. Supported formats: csv, json", format);
            std::process::exit(1);
        }
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            println!("Merged {} rows to {}", dataset.row_count(), path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn resolve_snapshot(
    snapshot: Option<PathBuf>,
    snapshot_dir: Option<PathBuf>,
    name: Option<String>,
) -> fold_core::Result<PathBuf> {
    match (snapshot, snapshot_dir, name) {
        (Some(path), _, _) => Ok(path),
        (None, Some(dir), Some(name)) => latest_snapshot(&[dir], &name),
        _ => {
            eprintln!("Provide either --snapshot FILE or --snapshot-dir DIR with --name NAME");
            std::process::exit(1);
        }
    }
}

fn cmd_preserve(
    snapshot: Option<PathBuf>,
    snapshot_dir: Option<PathBuf>,
    name: Option<String>,
    input: &std::path::Path,
    key: &[String],
    preserved: &[String],
    output: &std::path::Path,
) -> fold_core::Result<()> {
    let snapshot_path = resolve_snapshot(snapshot, snapshot_dir, name)?;
    let snapshot = read_csv(&snapshot_path)?;
    let fresh = read_csv(input)?;

    let result = preserve(&snapshot, &fresh, key, preserved)?;
    write_csv(&result, output)?;

    println!(
        "Preserved {} column(s) from {} onto {} rows -> {}",
        preserved.len(),
        snapshot_path.display(),
        result.row_count(),
        output.display()
    );

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_select_confirmed(
    snapshot: Option<PathBuf>,
    snapshot_dir: Option<PathBuf>,
    name: Option<String>,
    input: &std::path::Path,
    key: &[String],
    status_column: &str,
    status_value: &str,
    output: &std::path::Path,
) -> fold_core::Result<()> {
    let snapshot_path = resolve_snapshot(snapshot, snapshot_dir, name)?;
    let snapshot = read_csv(&snapshot_path)?;
    let dataset = read_csv(input)?;

    let result = select_confirmed(&snapshot, &dataset, key, status_column, status_value)?;
    write_csv(&result, output)?;

    println!(
        "{} of {} rows {} in {} -> {}",
        result.row_count(),
        dataset.row_count(),
        status_value,
        snapshot_path.display(),
        output.display()
    );

    Ok(())
}

fn cmd_show(file: &std::path::Path, limit: Option<usize>, columns: Option<String>) -> fold_core::Result<()> {
    let dataset = read_csv(file)?;

    println!("File: {}", file.display());
    println!("Columns: {}", dataset.column_count());
    println!("Rows: {}", dataset.row_count());
    println!();

    let col_filter: Option<Vec<&str>> = columns.as_ref().map(|c| c.split(',').collect());

    let display_cols: Vec<&fold_core::Column> = if let Some(ref filter) = col_filter {
        dataset
            .columns
            .iter()
            .filter(|c| filter.contains(&c.name.as_str()))
            .collect()
    } else {
        dataset.columns.iter().collect()
    };

    // Print header
    let header: Vec<&str> = display_cols.iter().map(|c| c.name.as_str()).collect();
    println!("{}", header.join("\t"));
    println!("{}", "-".repeat(header.len() * 12));

    // Print rows
    let row_limit = limit.unwrap_or(dataset.row_count());
    for row in dataset.rows.iter().take(row_limit) {
        let values: Vec<String> = display_cols
            .iter()
            .map(|col| {
                row.get(col.index)
                    .map(|v| v.to_field_string())
                    .unwrap_or_default()
            })
            .collect();
        println!("{}", values.join("\t"));
    }

    if dataset.row_count() > row_limit {
        println!("... ({} more rows)", dataset.row_count() - row_limit);
    }

    Ok(())
}

fn cmd_locate(
    file: &std::path::Path,
    row: Option<String>,
    column: Option<String>,
) -> fold_core::Result<()> {
    let dataset = read_csv(file)?;

    if row.is_none() && column.is_none() {
        eprintln!("Provide --row and/or --column to locate");
        std::process::exit(1);
    }

    if let Some(label) = column {
        let index = fold_core::locate::column_index(&dataset, &label)?;
        println!("Column '{}': index {}", label, index);
    }

    if let Some(label) = row {
        let index = fold_core::locate::row_index(&dataset, &label)?;
        println!("Row '{}': index {}", label, index);
    }

    Ok(())
}

fn cmd_snapshots(roots: &[PathBuf], verbose: bool) -> fold_core::Result<()> {
    let scan = scan_snapshots(roots)?;

    println!(
        "Found {} files in {} series",
        scan.total_files,
        scan.series.len()
    );
    println!();

    for series in &scan.series {
        if verbose {
            println!("{} ({} versions)", series.name, series.versions.len());
            for version in &series.versions {
                let date_str = match &version.published_on {
                    Some(d) => format!(" [{}]", d.format("%Y-%m-%d")),
                    None => " [undated]".to_string(),
                };
                println!("  {}{}", version.path.display(), date_str);
            }
            println!();
        } else {
            println!("  {} ({} versions)", series.name, series.versions.len());
        }
    }

    Ok(())
}

fn cmd_create_profile(
    output: &std::path::Path,
    key: Vec<String>,
    prefer_right: Vec<String>,
) -> fold_core::Result<()> {
    let mut profile = MergeProfile::new(key);
    profile.prefer_right = prefer_right;

    profile.save(output)?;
    println!("Created profile: {}", output.display());
    println!("Key columns: {}", profile.key_columns.join(", "));
    println!();
    println!("Edit the file to adjust placeholders or the override rule, then run:");
    println!(
        "  fold-cli merge --primary <a.csv> --secondary <b.csv> --profile {}",
        output.display()
    );

    Ok(())
}
