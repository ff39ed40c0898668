use grc_core::responses::ReviewSubmission;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Submit a plan for review. A rejected selection is printed and then
/// reported as an error so the exit status is non-zero.
pub async fn run(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let submission = ctx.service.submit_for_review(id).await?;
    output(&submission, flags.format)?;

    if let ReviewSubmission::Rejected { validation } = &submission {
        anyhow::bail!(
            "plan '{id}' was not submitted: {}",
            validation.errors.join("; ")
        );
    }
    Ok(())
}
