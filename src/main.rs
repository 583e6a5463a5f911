/* std use */
use std::io::Write as _;

/* crate use */
use clap::Parser as _;

/* project use */
use fqclean::cli;
use fqclean::error;
use fqclean::pipeline;
use fqclean::report;

fn main() -> error::Result<()> {
    // parse cli
    let params = cli::Command::parse();

    // Setup logger
    env_logger::Builder::new()
        .filter_level(params.level_filter())
        .parse_default_env()
        .init();

    let config = params.config()?;

    log::info!("Start processing reads");
    let summary = pipeline::run(&config)?;
    log::info!("End processing reads");

    let mut stdout = std::io::stdout().lock();
    if !config.plot_only {
        report::write_summary(&mut stdout, &summary.counters)
            .and_then(|_| stdout.flush())
            .map_err(|source| error::Error::WriteOutput { source })?;
    }

    if config.export_plot() {
        log::info!("Start export plot data");
        for path in report::write_plot_data(&config.outpre, &summary.sample)? {
            log::info!("write {}", path.display());
        }
        log::info!("End export plot data");
    }

    Ok(())
}
