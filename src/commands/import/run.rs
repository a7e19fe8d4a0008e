use chrono::Utc;

use super::*;
use crate::cli::ImportArgs;
use crate::model::ImportRunManifest;
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty};

pub fn run(args: ImportArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("import-{}", utc_compact_string(started_ts));

    let location = match &args.bundle {
        Some(bundle) => SourceLocation::Bundle(bundle.clone()),
        None => SourceLocation::Directory(args.data_dir.clone()),
    };

    info!(source = %location.describe(), run_id = %run_id, "starting import");

    let LoadedSource { tables, hashes } = load_source(&location)?;
    let Normalized { model, counts } = normalize(&tables)
        .with_context(|| format!("{} failed integrity checks", location.describe()))?;

    let output_path = if args.dry_run {
        info!(
            targets = model.targets.len(),
            questions = model.questions.len(),
            "dry run complete, no output written"
        );
        None
    } else {
        write_json_pretty(&args.output, &model)?;
        info!(path = %args.output.display(), "wrote decision model");
        Some(args.output.display().to_string())
    };

    if let Some(manifest_path) = &args.manifest_path {
        let manifest = ImportRunManifest {
            manifest_version: 1,
            run_id,
            status: "completed".to_string(),
            started_at,
            completed_at: now_utc_string(),
            source: location.describe(),
            output_path,
            dry_run: args.dry_run,
            source_hashes: hashes,
            counts,
        };
        write_json_pretty(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote import run manifest");
    }

    Ok(())
}
