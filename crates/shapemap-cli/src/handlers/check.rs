//! Check command handler

use super::utils::{load_document, middleware_registry};
use crate::cli::{CheckArgs, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use shapemap_core::Template;

/// Handle the check command
///
/// Compiles the template with the same settings `map` would use and reports
/// its node counts. Compilation errors propagate as mapping errors.
pub async fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    output.info(&format!("Checking template: {}", args.template.display()))?;

    let document = load_document(&args.template)?;
    let mapper_config = config.mapper_config(args.marker);
    let registry = middleware_registry(config, args.no_defaults);
    let template = Template::compile(&document, registry.as_ref(), &mapper_config)?;
    let stats = template.stats();
    tracing::debug!(?stats, "Template compiled");

    if output.format() != OutputFormat::Human {
        return output.stats(&stats);
    }

    output.success("✓ Template is valid")?;
    output.section("Template")?;
    output.stats(&stats)?;

    if let Some(registry) = &registry {
        let mut names = registry.names();
        names.sort_unstable();
        output.section("Middleware")?;
        output.table(
            &["Function"],
            names.into_iter().map(|name| vec![name.to_string()]).collect(),
        )?;
    }
    Ok(())
}
