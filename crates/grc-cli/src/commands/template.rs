use anyhow::Context;
use grc_core::responses::TemplateSummary;
use grc_core::template::TemplateService;
use serde::Serialize;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::TemplateCommands;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct TemplateListResponse {
    templates: Vec<TemplateSummary>,
}

/// Handle `grc template`.
pub async fn handle(
    action: &TemplateCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let templates = ctx.service.templates();
    match action {
        TemplateCommands::List => output(
            &TemplateListResponse {
                templates: templates
                    .get_available_templates()
                    .iter()
                    .map(TemplateSummary::from_definition)
                    .collect(),
            },
            flags.format,
        ),
        TemplateCommands::Get { id } => {
            let template = templates
                .get_template(id)
                .with_context(|| format!("template '{id}' not found"))?;
            output(template, flags.format)
        }
        TemplateCommands::Categories { id, grouped } => {
            require_template(templates, id)?;
            if *grouped {
                output(&templates.get_categories_grouped(id), flags.format)
            } else {
                output(
                    &json!({ "categories": templates.get_template_categories(id) }),
                    flags.format,
                )
            }
        }
        TemplateCommands::Recommended { id } => {
            require_template(templates, id)?;
            output(
                &json!({
                    "template_id": id,
                    "recommended": templates.get_recommended_categories(id),
                    "required": templates.required_category_ids(id),
                }),
                flags.format,
            )
        }
        TemplateCommands::Counts { id } => {
            require_template(templates, id)?;
            output(&templates.get_category_count_by_group(id), flags.format)
        }
        TemplateCommands::Search { id, term } => {
            require_template(templates, id)?;
            output(
                &json!({ "categories": templates.search_categories(id, term) }),
                flags.format,
            )
        }
        TemplateCommands::Validate { id, categories } => output(
            &templates.validate_category_selection(id, categories),
            flags.format,
        ),
    }
}

fn require_template(templates: &TemplateService, id: &str) -> anyhow::Result<()> {
    if templates.get_template(id).is_none() {
        anyhow::bail!("template '{id}' not found");
    }
    Ok(())
}
