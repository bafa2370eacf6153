use radview_core::{CredentialStore, TemplateManagerView, parse_findings};

use crate::cli::{OutputFormat, TemplateAddArgs, TemplateEditArgs};
use crate::client::{AppContext, CliError, CliResult, ensure_loaded};
use crate::output::render_template_list;

pub(crate) async fn handle_template_list<S: CredentialStore>(
    ctx: &AppContext<S>,
    format: OutputFormat,
) -> CliResult<()> {
    let view = load_catalog(ctx).await?;
    render_template_list(view.templates(), format)
}

pub(crate) async fn handle_template_add<S: CredentialStore>(
    ctx: &AppContext<S>,
    args: TemplateAddArgs,
) -> CliResult<()> {
    let mut view = load_catalog(ctx).await?;
    let form = view.open_create_form();
    form.heading = args.heading;
    form.findings_input = args.findings;
    form.impression = args.impression;

    view.create(&ctx.api, ctx.session.session()).await?;
    println!(
        "Template created; catalog now holds {} templates.",
        view.templates().len()
    );
    Ok(())
}

pub(crate) async fn handle_template_edit<S: CredentialStore>(
    ctx: &AppContext<S>,
    args: TemplateEditArgs,
) -> CliResult<()> {
    if args.heading.is_none() && args.findings.is_none() && args.impression.is_none() {
        return Err(CliError::validation(
            "nothing to change (pass --heading, --findings, or --impression)",
        ));
    }
    let mut view = load_catalog(ctx).await?;
    let index = view
        .templates()
        .iter()
        .position(|template| template.id.0 == args.id)
        .ok_or_else(|| CliError::validation(format!("no template with key '{}'", args.id)))?;

    let draft = view.begin_edit(index)?;
    if let Some(heading) = args.heading {
        draft.heading = heading;
    }
    if let Some(findings) = args.findings.as_deref() {
        draft.findings = parse_findings(findings);
    }
    if let Some(impression) = args.impression {
        draft.impression = impression;
    }

    view.save_edit(&ctx.api, ctx.session.session()).await?;
    println!("Template {} updated.", args.id);
    Ok(())
}

async fn load_catalog<S: CredentialStore>(ctx: &AppContext<S>) -> CliResult<TemplateManagerView> {
    let mut view = TemplateManagerView::new();
    view.load(&ctx.api, ctx.session.session()).await;
    ensure_loaded(view.state())?;
    Ok(view)
}
