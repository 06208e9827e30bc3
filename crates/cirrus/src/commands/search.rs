//! Search command: fresh fetch of every collection, grouped hits.

use std::fmt::Write;

use tabled::Tabled;

use cirrus_core::presentation::{ResultGroup, ResultGroups};
use cirrus_core::search::{SearchHit, query_from_location, search};
use cirrus_core::{Controller, CoreError, NavigationState, SearchSession};

use crate::cli::{GlobalOpts, OutputFormat, SearchArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct HitRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<&SearchHit> for HitRow {
    fn from(h: &SearchHit) -> Self {
        Self {
            id: h.id.to_string(),
            label: h.label.clone(),
            description: h.description.clone(),
            tags: h.tags.join(", "),
        }
    }
}

/// `/search?query=web` and `?query=web` both name the query "web";
/// anything else is the query itself.
fn normalize_query(raw: &str) -> String {
    if raw.starts_with('/') || raw.starts_with('?') {
        query_from_location(raw).unwrap_or_default()
    } else {
        raw.to_owned()
    }
}

fn render(view: &ResultGroups, query: &str, color: bool) -> String {
    if let Some(ref error) = view.error {
        return error.clone();
    }
    if view.no_results {
        return format!("No results for \"{query}\".");
    }
    let mut out = String::new();
    for group in view.non_empty() {
        render_group(&mut out, group, color);
    }
    out.trim_end().to_owned()
}

fn render_group(out: &mut String, group: &ResultGroup, color: bool) {
    let _ = writeln!(out, "{}", output::heading(group.title, color));
    let rows: Vec<HitRow> = group.hits.iter().map(HitRow::from).collect();
    let _ = writeln!(out, "{}", output::render_table(&rows));
    if let Some(showing) = group.showing() {
        let _ = writeln!(out, "{}", output::dim(&showing, color));
    }
    out.push('\n');
}

/// `connected` is the outcome of loading the account. A failed load ends in
/// the same error state as a failed fetch.
pub async fn handle(
    controller: &Controller,
    args: SearchArgs,
    connected: Result<(), CoreError>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let settings = controller.config().search;
    let ranking = args.ranking.unwrap_or(settings.ranking);
    let group_size = args.group_size.unwrap_or(settings.group_size);
    let query = normalize_query(&args.query);

    let mut session = SearchSession::new();
    let mut failure = None;
    if let Some(ticket) = session.mount(NavigationState::new(query.clone())) {
        let fetched = match connected {
            Ok(()) => controller.fetch_search_corpus().await,
            Err(e) => Err(e),
        };
        let outcome = match fetched {
            Ok(corpus) => Ok(search(ticket.query(), &corpus, ranking)),
            Err(e) => {
                let logged = CoreError::Internal(e.summary());
                failure = Some(e);
                Err(logged)
            }
        };
        session.complete(&ticket, outcome);
    }

    let color = output::should_color(global.color);
    let view = ResultGroups::build(session.state(), group_size);
    if let Some(error) = failure {
        if global.output == OutputFormat::Table && !global.quiet {
            eprintln!("{}", render(&view, &query, color));
        }
        return Err(error.into());
    }

    let results = session.state().results().cloned().unwrap_or_default();
    let out = output::render_single(
        global.output,
        &*results,
        |_| render(&view, &query, color),
        |r| {
            r.iter()
                .flat_map(|(kind, hits)| hits.iter().map(move |h| format!("{kind}\t{}", h.id)))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cirrus_core::search::SEARCH_ERROR_MESSAGE;
    use cirrus_core::{SearchResults, SearchState};

    use super::*;

    #[test]
    fn location_queries_are_unwrapped() {
        assert_eq!(normalize_query("/search?query=web+01"), "web 01");
        assert_eq!(normalize_query("?query=db"), "db");
        assert_eq!(normalize_query("plain"), "plain");
        assert_eq!(normalize_query("/search"), "");
    }

    #[test]
    fn zero_hits_render_no_results() {
        let state = SearchState::Done(Arc::new(SearchResults::empty()));
        let view = ResultGroups::build(&state, 100);
        insta::assert_snapshot!(render(&view, "zzz", false), @r#"No results for "zzz"."#);
    }

    #[test]
    fn failed_search_renders_single_message() {
        let state = SearchState::Failed(SEARCH_ERROR_MESSAGE.into());
        let view = ResultGroups::build(&state, 100);
        assert_eq!(render(&view, "web", false), SEARCH_ERROR_MESSAGE);
    }
}
