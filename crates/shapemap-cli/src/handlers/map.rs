//! Map command handler

use super::utils::{load_document, middleware_registry, save_document, STDIN_PATH};
use crate::cli::MapArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use serde_json::Value;
use shapemap_core::{Mapper, Mapping};

/// Handle the map command
pub async fn handle_map(args: MapArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let stdin_count = args.sources.iter().filter(|p| p.as_os_str() == STDIN_PATH).count();
    if stdin_count > 1 || (stdin_count == 1 && args.template.as_os_str() == STDIN_PATH) {
        return Err(Error::invalid_args("standard input ('-') can only be read once"));
    }

    output.info(&format!("Loading template: {}", args.template.display()))?;
    let mapper = {
        let _timer = Timer::with_details("compile_template", &args.template.display().to_string());
        let template = load_document(&args.template)?;
        let mapper_config = config.mapper_config(args.marker);
        Mapper::from_config(template, middleware_registry(config, args.no_defaults), &mapper_config)?
    };

    let sources = {
        let _timer = Timer::with_details("load_sources", &format!("{} sources", args.sources.len()));
        args.sources
            .iter()
            .map(|path| load_document(path))
            .collect::<Result<Vec<Value>>>()?
    };
    output.info(&format!("Mapping {} source document(s)", sources.len()))?;

    let timer = Timer::new("map");
    let result = settle(mapper.map(&sources)?, output).await?;
    let elapsed = timer.finish();
    tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "Mapping finished");

    let pretty = args.pretty || config.output.pretty;
    match args.save_to {
        Some(path) => {
            save_document(&path, &result, pretty)?;
            output.success(&format!("✓ Result written to {}", path.display()))?;
        }
        None => output.mapped(&result, pretty)?,
    }

    Ok(())
}

/// Wait for deferred middleware results, with a spinner on a terminal
async fn settle(mapping: Mapping, output: &OutputWriter) -> Result<Value> {
    match mapping {
        Mapping::Ready(value) => Ok(value),
        Mapping::Deferred(deferred) => {
            tracing::debug!(pending = deferred.pending_count(), "Waiting for deferred middleware");
            let spinner = output.spinner("Waiting for middleware results...");
            let result = deferred.await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }
            Ok(result?)
        }
    }
}
