use crate::cli::InfoArgs;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::files::read_star;
use crate::utils::progress::file_progress_bar;
use rayon::prelude::*;
use relion_star::core::models::star_file::{BlockStyle, StarFile};
use std::path::Path;
use tracing::{error, info};

pub fn run(args: InfoArgs, config: &AppConfig) -> Result<()> {
    info!("Summarizing {} file(s)...", args.files.len());
    let pb = file_progress_bar(args.files.len());

    let summaries: Vec<Result<String>> = args
        .files
        .par_iter()
        .map(|path| {
            let summary = read_star(path, &config.parse).map(|star| summarize(path, &star));
            pb.inc(1);
            summary
        })
        .collect();
    pb.finish_and_clear();

    let mut failures = 0;
    for summary in summaries {
        match summary {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("{}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(CliError::Other(anyhow::anyhow!(
            "{} of {} file(s) could not be read",
            failures,
            args.files.len()
        )));
    }
    Ok(())
}

fn summarize(path: &Path, star: &StarFile) -> String {
    let mut lines = vec![format!("{} ({} block(s))", path.display(), star.len())];
    for block in star.blocks() {
        let table = block.table();
        let style = match block.style() {
            BlockStyle::Loop => "loop",
            BlockStyle::Pairs => "pairs",
        };
        lines.push(format!(
            "  data_{} [{}] {} row(s), {} column(s)",
            block.name(),
            style,
            table.len(),
            table.num_columns()
        ));
        let width = table.labels().map(str::len).max().unwrap_or(0);
        for column in table.columns() {
            lines.push(format!(
                "    _{:<width$}  {}",
                column.label(),
                column.kind(),
                width = width
            ));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use relion_star::core::io::parser::ParseOptions;

    #[test]
    fn summary_lists_blocks_and_column_types() {
        let star = StarFile::parse_str(
            "data_general\n_rlnNrClasses 4\n\ndata_particles\nloop_\n_rlnImageName\n_rlnClassNumber\n1@a.mrcs 2\n2@a.mrcs 1\n",
            &ParseOptions::relion(),
        )
        .unwrap();
        let text = summarize(Path::new("run_it025_data.star"), &star);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "run_it025_data.star (2 block(s))");
        assert_eq!(lines[1], "  data_general [pairs] 1 row(s), 1 column(s)");
        assert_eq!(lines[2], "    _rlnNrClasses  int");
        assert_eq!(lines[3], "  data_particles [loop] 2 row(s), 2 column(s)");
        assert_eq!(lines[4], "    _rlnImageName    str");
        assert_eq!(lines[5], "    _rlnClassNumber  int");
    }
}
