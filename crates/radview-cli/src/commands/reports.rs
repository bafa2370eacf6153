use radview_api_models::ReportId;
use radview_core::{CredentialStore, ReportDetailView, ReportEdit, ReportListView};

use crate::cli::{
    OutputFormat, ReportEditArgs, ReportListArgs, ReportPredictArgs, ReportShowArgs,
};
use crate::client::{AppContext, CliError, CliResult, ensure_loaded};
use crate::output::{render_predictions, render_report_detail, render_report_page};

pub(crate) async fn handle_report_list<S: CredentialStore>(
    ctx: &AppContext<S>,
    args: ReportListArgs,
    format: OutputFormat,
) -> CliResult<()> {
    if args.page == 0 {
        return Err(CliError::validation("page numbers start at 1"));
    }
    let mut view = ReportListView::new();
    view.load(&ctx.api, ctx.session.session()).await;
    ensure_loaded(view.state())?;

    view.set_status_filter(args.status);
    view.set_search(args.search.unwrap_or_default());
    view.set_page(args.page);
    render_report_page(&view, format)
}

pub(crate) async fn handle_report_show<S: CredentialStore>(
    ctx: &AppContext<S>,
    args: ReportShowArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let mut view = load_detail(ctx, &args.id).await?;
    if args.predict {
        view.run_predictions(&ctx.predictions, ctx.session.session())
            .await?;
    }
    render_report_detail(&view, format)
}

pub(crate) async fn handle_report_edit<S: CredentialStore>(
    ctx: &AppContext<S>,
    args: ReportEditArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let mut view = load_detail(ctx, &args.id).await?;

    if args.revise {
        view.enter_edit_mode()?;
    }
    if let Some(history) = args.history {
        view.apply_edit(&ReportEdit::History(history))?;
    }
    for side in args.sides {
        view.apply_edit(&ReportEdit::ImageSide {
            index: side.index,
            side: side.side,
        })?;
    }
    if let Some(status) = args.status {
        view.apply_edit(&ReportEdit::Status(status))?;
    }
    if let Some(feedback) = args.feedback {
        view.apply_edit(&ReportEdit::Feedback(feedback))?;
    }
    if let Some(heading) = args.template.as_deref() {
        view.select_template(heading)?;
    }

    if !view.is_dirty() && view.selected_template().is_none() {
        return Err(CliError::validation(
            "nothing to change (pass --history, --side, or --revise with --status/--feedback/--template)",
        ));
    }

    view.save(&ctx.api, ctx.session.session()).await?;
    println!("Report {} saved.", view.id());
    ensure_loaded(view.state())?;
    render_report_detail(&view, format)
}

pub(crate) async fn handle_report_predict<S: CredentialStore>(
    ctx: &AppContext<S>,
    args: ReportPredictArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let mut view = load_detail(ctx, &args.id).await?;
    view.run_predictions(&ctx.predictions, ctx.session.session())
        .await?;
    render_predictions(&view, format)
}

async fn load_detail<S: CredentialStore>(
    ctx: &AppContext<S>,
    id: &str,
) -> CliResult<ReportDetailView> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CliError::validation("report key must not be empty"));
    }
    let mut view = ReportDetailView::new(ReportId::from(id));
    view.load(&ctx.api, ctx.session.session()).await;
    ensure_loaded(view.state())?;
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use radview_config::ClientSettings;
    use radview_core::{ApiClient, MemoryCredentialStore};
    use radview_test_support::fixtures::{
        prediction_json, report_collection, report_json, template_catalog, template_json,
    };
    use serde_json::json;

    use crate::cli::SideEditArg;

    fn context_for(server: &MockServer, token: Option<&str>) -> AppContext<MemoryCredentialStore> {
        let config = ClientSettings {
            api_url: Some(server.base_url()),
            predict_url: Some(server.url("/ml")),
            credential_path: Some("unused.json".into()),
            ..ClientSettings::default()
        }
        .validate()
        .expect("settings validate");
        let api = ApiClient::new(&config, None).expect("client builds");
        let credentials = token.map_or_else(MemoryCredentialStore::default, |token| {
            MemoryCredentialStore::with_token(token)
        });
        AppContext::with_store(api, &config, credentials)
    }

    fn mock_report(server: &MockServer, status: &str) {
        let body = json!({"report": report_json("r-1", "Jane Roe", status)});
        server.mock(move |when, then| {
            when.method(GET).path("/report/r-1");
            then.status(200).json_body(body);
        });
        server.mock(|when, then| {
            when.method(GET).path("/templates");
            then.status(200).json_body(template_catalog(vec![template_json(
                "t-1",
                "Chest Follow-up",
                &["Improved opacity"],
                "Resolving",
            )]));
        });
    }

    #[tokio::test]
    async fn list_requires_login() {
        let server = MockServer::start_async().await;
        let ctx = context_for(&server, None);
        let args = ReportListArgs {
            page: 1,
            ..ReportListArgs::default()
        };
        let err = handle_report_list(&ctx, args, OutputFormat::Table)
            .await
            .expect_err("no token");
        assert_eq!(err.display_message(), "not logged in (run `radview login` first)");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn list_renders_requested_page() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/reports")
                .header("authorization", "Bearer tok");
            then.status(200).json_body(report_collection(25, &["Pending"]));
        });

        let ctx = context_for(&server, Some("tok"));
        handle_report_list(
            &ctx,
            ReportListArgs {
                page: 3,
                ..ReportListArgs::default()
            },
            OutputFormat::Json,
        )
        .await
        .expect("list renders");
        mock.assert();
    }

    #[tokio::test]
    async fn list_failure_exits_with_failure_code() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/reports");
            then.status(500).json_body(json!({"message": "database unavailable"}));
        });

        let ctx = context_for(&server, Some("tok"));
        let args = ReportListArgs {
            page: 1,
            ..ReportListArgs::default()
        };
        let err = handle_report_list(&ctx, args, OutputFormat::Table)
            .await
            .expect_err("server error");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(
            err.display_message(),
            "list reports returned status 500: database unavailable"
        );
    }

    #[tokio::test]
    async fn edit_saves_side_label_change() {
        let server = MockServer::start_async().await;
        mock_report(&server, "Pending");
        let update = server.mock(|when, then| {
            when.method(PUT)
                .path("/report/r-1")
                .body_includes(r#""side":"AP""#);
            then.status(200);
        });

        let ctx = context_for(&server, Some("tok"));
        handle_report_edit(
            &ctx,
            ReportEditArgs {
                id: "r-1".into(),
                sides: vec![SideEditArg {
                    index: 0,
                    side: "AP".into(),
                }],
                ..ReportEditArgs::default()
            },
            OutputFormat::Json,
        )
        .await
        .expect("edit saves");
        update.assert();
    }

    #[tokio::test]
    async fn revision_of_pending_report_is_refused() {
        let server = MockServer::start_async().await;
        mock_report(&server, "Pending");
        let update = server.mock(|when, then| {
            when.method(PUT).path("/report/r-1");
            then.status(200);
        });

        let ctx = context_for(&server, Some("tok"));
        let err = handle_report_edit(
            &ctx,
            ReportEditArgs {
                id: "r-1".into(),
                revise: true,
                template: Some("Chest Follow-up".into()),
                ..ReportEditArgs::default()
            },
            OutputFormat::Table,
        )
        .await
        .expect_err("pending report cannot be revised");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.display_message(),
            "only completed reports can be revised (status is Pending)"
        );
        assert_eq!(update.calls(), 0);
    }

    #[tokio::test]
    async fn edit_without_changes_is_a_validation_error() {
        let server = MockServer::start_async().await;
        mock_report(&server, "Complete");

        let ctx = context_for(&server, Some("tok"));
        let err = handle_report_edit(
            &ctx,
            ReportEditArgs {
                id: "r-1".into(),
                ..ReportEditArgs::default()
            },
            OutputFormat::Table,
        )
        .await
        .expect_err("nothing to save");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn predict_renders_each_image() {
        let server = MockServer::start_async().await;
        mock_report(&server, "Complete");
        for path in ["/images/r-1-1.jpg", "/images/r-1-2.jpg"] {
            server.mock(|when, then| {
                when.method(GET).path(path);
                then.status(200).body(vec![0xFF, 0xD8]);
            });
        }
        let predict = server.mock(|when, then| {
            when.method(POST).path("/ml/predict");
            then.status(200).json_body(prediction_json("Normal chest", 0.8421));
        });

        let ctx = context_for(&server, Some("tok"));
        handle_report_predict(
            &ctx,
            ReportPredictArgs { id: "r-1".into() },
            OutputFormat::Table,
        )
        .await
        .expect("predictions render");
        predict.assert_calls(2);
    }
}
